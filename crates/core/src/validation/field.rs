//! Per-field validation — pure logic, no I/O.

use std::sync::OnceLock;

use regex::Regex;

use crate::answers::AnswerValue;
use crate::snapshot::{FieldSchema, FieldType};

use super::rules::{ErrorCode, FieldError, MxResolver};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid pattern")
    })
}

fn e164_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+[1-9]\d{7,14}$").expect("valid pattern"))
}

/// Validate one field against its (possibly absent) answer.
///
/// A required field with no answer yields exactly one `REQUIRED` error and
/// no type checks. Otherwise all applicable rule violations for the field
/// are accumulated.
pub fn validate_field(
    field: &FieldSchema,
    answer: Option<&AnswerValue>,
    mx: &dyn MxResolver,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let Some(answer) = answer else {
        if field.props.required {
            errors.push(FieldError::new(&field.name, ErrorCode::Required));
        }
        return errors;
    };

    match field.field_type {
        FieldType::Text | FieldType::Textarea => check_text(field, answer, &mut errors),
        FieldType::Number => check_number(field, answer, &mut errors),
        FieldType::Select => check_choice(field, answer, field.props.allow_custom, &mut errors),
        FieldType::Radio => check_choice(field, answer, false, &mut errors),
        FieldType::Multiselect => check_choices(field, answer, &mut errors),
        // Only required-ness is enforced; any present value passes.
        FieldType::Checkbox | FieldType::Switch => {}
        FieldType::Email => check_email(field, answer, mx, &mut errors),
        FieldType::Phone => check_phone(field, answer, &mut errors),
        FieldType::FileUpload => check_files(field, answer, &mut errors),
        FieldType::Date | FieldType::Time | FieldType::Datetime => {
            check_timestamp(field, answer, &mut errors)
        }
        // Informational / unrecognized fields carry no validation.
        FieldType::Info | FieldType::Unknown => {}
    }

    errors
}

fn check_text(field: &FieldSchema, answer: &AnswerValue, errors: &mut Vec<FieldError>) {
    let AnswerValue::Text(s) = answer else {
        errors.push(FieldError::new(&field.name, ErrorCode::Invalid));
        return;
    };
    if let Some(max) = field.props.max_length {
        // Rune count, not byte length.
        if s.chars().count() > max as usize {
            errors.push(
                FieldError::new(&field.name, ErrorCode::TooLong)
                    .with_details(serde_json::json!({"max": max})),
            );
        }
    }
    if let Some(pattern) = &field.props.pattern {
        // A pattern that fails to compile is skipped, matching the
        // original's lenient treatment of bad snapshot data.
        if let Ok(re) = Regex::new(pattern) {
            if !re.is_match(s) {
                errors.push(FieldError::new(&field.name, ErrorCode::Pattern));
            }
        }
    }
}

fn check_number(field: &FieldSchema, answer: &AnswerValue, errors: &mut Vec<FieldError>) {
    let AnswerValue::Number(n) = answer else {
        errors.push(FieldError::new(&field.name, ErrorCode::Invalid));
        return;
    };
    if let Some(min) = field.props.min {
        if *n < min {
            errors.push(
                FieldError::new(&field.name, ErrorCode::Min)
                    .with_details(serde_json::json!({"min": min})),
            );
        }
    }
    if let Some(max) = field.props.max {
        if *n > max {
            errors.push(
                FieldError::new(&field.name, ErrorCode::Max)
                    .with_details(serde_json::json!({"max": max})),
            );
        }
    }
}

fn check_choice(
    field: &FieldSchema,
    answer: &AnswerValue,
    allow_custom: bool,
    errors: &mut Vec<FieldError>,
) {
    let AnswerValue::Choice(c) = answer else {
        errors.push(FieldError::new(&field.name, ErrorCode::Invalid));
        return;
    };
    if !allow_custom && !field.has_option(&c.value) {
        errors.push(FieldError::new(&field.name, ErrorCode::NotAllowed));
    }
}

fn check_choices(field: &FieldSchema, answer: &AnswerValue, errors: &mut Vec<FieldError>) {
    let AnswerValue::Choices(choices) = answer else {
        errors.push(FieldError::new(&field.name, ErrorCode::Invalid));
        return;
    };
    if field.props.allow_custom {
        return;
    }
    for c in choices {
        if !field.has_option(&c.value) {
            errors.push(
                FieldError::new(&field.name, ErrorCode::NotAllowed)
                    .with_details(serde_json::json!({"value": c.value})),
            );
        }
    }
}

fn check_email(
    field: &FieldSchema,
    answer: &AnswerValue,
    mx: &dyn MxResolver,
    errors: &mut Vec<FieldError>,
) {
    let normalized = match answer {
        AnswerValue::Text(s) => s.trim().to_lowercase(),
        _ => String::new(),
    };
    if !email_regex().is_match(&normalized) {
        errors.push(FieldError::new(&field.name, ErrorCode::InvalidEmail));
    }
    if field.props.mx_check {
        if let Some((_, domain)) = normalized.split_once('@') {
            if mx.has_mx(domain) == Some(false) {
                errors.push(FieldError::new(&field.name, ErrorCode::NoMx));
            }
        }
    }
}

fn check_phone(field: &FieldSchema, answer: &AnswerValue, errors: &mut Vec<FieldError>) {
    let AnswerValue::Phone(p) = answer else {
        errors.push(FieldError::new(&field.name, ErrorCode::Invalid));
        return;
    };
    if field.props.e164_required && !e164_regex().is_match(&p.e164) {
        errors.push(FieldError::new(&field.name, ErrorCode::E164));
    }
}

fn check_files(field: &FieldSchema, answer: &AnswerValue, errors: &mut Vec<FieldError>) {
    let AnswerValue::Files(files) = answer else {
        errors.push(FieldError::new(&field.name, ErrorCode::Invalid));
        return;
    };
    let max_files = field.props.max_files.unwrap_or(1).max(1);
    if files.len() > max_files as usize {
        errors.push(
            FieldError::new(&field.name, ErrorCode::TooMany)
                .with_details(serde_json::json!({"max": max_files})),
        );
    }
    for f in files {
        if f.id.is_none() || f.url.is_none() {
            errors.push(FieldError::new(&field.name, ErrorCode::MissingMeta));
        }
    }
}

fn check_timestamp(field: &FieldSchema, answer: &AnswerValue, errors: &mut Vec<FieldError>) {
    let valid = matches!(
        answer,
        AnswerValue::Text(s) if chrono::DateTime::parse_from_rfc3339(s).is_ok()
    );
    if !valid {
        errors.push(FieldError::new(&field.name, ErrorCode::Invalid));
    }
}
