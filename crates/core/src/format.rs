//! Human-readable answer formatting.
//!
//! Used for the default (template-less) webhook payload and exposed to
//! body templates as the `formatAnswer` helper.

use serde::Serialize;

use crate::answers::{AnswerValue, Choice, FileRef};

/// One row of the default payload's `answers` array.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// Render any answer value to a display string.
///
/// Locale only affects booleans (Yes/No vs نعم/لا). Whole-numbered floats
/// render without a decimal point. Lists are comma-joined.
pub fn format_answer(value: &AnswerValue, locale: &str) -> String {
    match value {
        AnswerValue::Text(s) => s.clone(),
        AnswerValue::Number(n) => format_number(*n),
        AnswerValue::Bool(b) => format_bool(*b, locale).to_string(),
        AnswerValue::Choice(c) => format_choice(c),
        AnswerValue::Choices(cs) => cs
            .iter()
            .map(format_choice)
            .collect::<Vec<_>>()
            .join(", "),
        AnswerValue::Phone(p) => p.e164.clone(),
        AnswerValue::Location { lat, lng } => format!("{lat:.6}, {lng:.6}"),
        AnswerValue::File(f) => format_file(f),
        AnswerValue::Files(fs) => fs.iter().map(format_file).collect::<Vec<_>>().join(", "),
        AnswerValue::Other(v) => match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn format_bool(b: bool, locale: &str) -> &'static str {
    match (b, locale) {
        (true, "ar") => "نعم",
        (false, "ar") => "لا",
        (true, _) => "Yes",
        (false, _) => "No",
    }
}

/// The `other` free-text choice renders as its text; an empty text keeps
/// the literal `"other"` rather than dropping the item.
fn format_choice(c: &Choice) -> String {
    match (&c.value, &c.other) {
        (v, Some(text)) if v == "other" && !text.is_empty() => text.clone(),
        (v, _) => v.clone(),
    }
}

fn format_file(f: &FileRef) -> String {
    if let Some(url) = &f.url {
        return url.clone();
    }
    if let Some(name) = &f.name {
        return name.clone();
    }
    serde_json::to_string(f).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decoded(raw: serde_json::Value) -> AnswerValue {
        AnswerValue::from_json(&raw)
    }

    #[test]
    fn booleans_localize() {
        assert_eq!(format_answer(&decoded(json!(true)), "en"), "Yes");
        assert_eq!(format_answer(&decoded(json!(false)), "en"), "No");
        assert_eq!(format_answer(&decoded(json!(true)), "ar"), "نعم");
        assert_eq!(format_answer(&decoded(json!(false)), "ar"), "لا");
    }

    #[test]
    fn whole_numbers_drop_the_decimal_point() {
        assert_eq!(format_answer(&decoded(json!(42.0)), "en"), "42");
        assert_eq!(format_answer(&decoded(json!(2.5)), "en"), "2.5");
    }

    #[test]
    fn phone_renders_e164() {
        let v = decoded(json!({"e164": "+966500112233", "country": "SA"}));
        assert_eq!(format_answer(&v, "en"), "+966500112233");
    }

    #[test]
    fn location_renders_six_decimals() {
        let v = decoded(json!({"lat": 24.7136, "lng": 46.675296}));
        assert_eq!(format_answer(&v, "en"), "24.713600, 46.675296");
    }

    #[test]
    fn file_renders_url() {
        let v = decoded(json!([{"id": 1, "url": "https://cdn/a.pdf"}]));
        assert_eq!(format_answer(&v, "en"), "https://cdn/a.pdf");
    }

    #[test]
    fn multiselect_joins_formatted_items() {
        let v = decoded(json!([
            {"value": "red"},
            {"value": "other", "other": "teal"}
        ]));
        assert_eq!(format_answer(&v, "en"), "red, teal");
    }

    #[test]
    fn empty_other_text_keeps_the_literal() {
        let v = decoded(json!([{"value": "other", "other": ""}]));
        assert_eq!(format_answer(&v, "en"), "other");
    }
}
