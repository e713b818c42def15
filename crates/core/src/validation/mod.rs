//! Submission validation.
//!
//! [`validate_submission`] walks the snapshot's active fields in schema
//! order and accumulates every violation; it never short-circuits, so
//! callers can show all problems at once.

mod field;
mod rules;

pub use field::validate_field;
pub use rules::{ErrorCode, FieldError, MxResolver, NoopMxResolver};

use crate::answers::AnswerMap;
use crate::snapshot::FormSnapshot;

/// Validate decoded answers against a form snapshot.
///
/// Returns the complete, ordered list of violations; an empty list means
/// the submission is accepted. MX checking is skipped (soft pass).
pub fn validate_submission(snapshot: &FormSnapshot, answers: &AnswerMap) -> Vec<FieldError> {
    validate_submission_with(snapshot, answers, &NoopMxResolver)
}

/// Validate with an explicit [`MxResolver`] for the `mx_check` email rule.
pub fn validate_submission_with(
    snapshot: &FormSnapshot,
    answers: &AnswerMap,
    mx: &dyn MxResolver,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for field in snapshot.active_fields() {
        errors.extend(validate_field(field, answers.get(&field.name), mx));
    }
    errors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(fields: serde_json::Value) -> FormSnapshot {
        FormSnapshot::from_stored(
            "f".into(),
            1,
            &fields,
            &json!({}),
            &json!(["en", "ar"]),
        )
        .unwrap()
    }

    fn answers(raw: serde_json::Value) -> AnswerMap {
        AnswerMap::from_json(&raw)
    }

    fn codes(errors: &[FieldError]) -> Vec<ErrorCode> {
        errors.iter().map(|e| e.code).collect()
    }

    // --- required ---

    #[test]
    fn missing_required_field_yields_exactly_one_required_error() {
        let snap = snapshot(json!([
            {"name": "name", "type": "text", "props": {"required": true, "max_length": 3}}
        ]));
        let errs = validate_submission(&snap, &answers(json!({})));
        assert_eq!(codes(&errs), vec![ErrorCode::Required]);
        assert_eq!(errs[0].field, "name");
        assert_eq!(errs[0].message["ar"], "مطلوب");
    }

    #[test]
    fn optional_absent_field_yields_no_errors() {
        let snap = snapshot(json!([{"name": "nick", "type": "text", "props": {}}]));
        assert!(validate_submission(&snap, &answers(json!({}))).is_empty());
    }

    // --- text ---

    #[test]
    fn text_rules_accumulate() {
        let snap = snapshot(json!([
            {"name": "code", "type": "text",
             "props": {"max_length": 3, "pattern": "^[0-9]+$"}}
        ]));
        let errs = validate_submission(&snap, &answers(json!({"code": "abcd"})));
        assert_eq!(codes(&errs), vec![ErrorCode::TooLong, ErrorCode::Pattern]);
    }

    #[test]
    fn max_length_counts_chars_not_bytes() {
        let snap = snapshot(json!([
            {"name": "name", "type": "text", "props": {"max_length": 4}}
        ]));
        // Four Arabic letters, twice as many bytes.
        let errs = validate_submission(&snap, &answers(json!({"name": "سلام!"})));
        assert_eq!(codes(&errs), vec![ErrorCode::TooLong]);
        let ok = validate_submission(&snap, &answers(json!({"name": "سلام"})));
        assert!(ok.is_empty());
    }

    #[test]
    fn uncompilable_pattern_is_skipped() {
        let snap = snapshot(json!([
            {"name": "x", "type": "text", "props": {"pattern": "(["}}
        ]));
        assert!(validate_submission(&snap, &answers(json!({"x": "anything"}))).is_empty());
    }

    #[test]
    fn non_string_text_answer_is_invalid() {
        let snap = snapshot(json!([{"name": "x", "type": "textarea", "props": {}}]));
        let errs = validate_submission(&snap, &answers(json!({"x": 5})));
        assert_eq!(codes(&errs), vec![ErrorCode::Invalid]);
    }

    // --- number ---

    #[test]
    fn number_bounds() {
        let snap = snapshot(json!([
            {"name": "age", "type": "number", "props": {"min": 18, "max": 99}}
        ]));
        assert!(validate_submission(&snap, &answers(json!({"age": 40}))).is_empty());
        let low = validate_submission(&snap, &answers(json!({"age": 3})));
        assert_eq!(codes(&low), vec![ErrorCode::Min]);
        let high = validate_submission(&snap, &answers(json!({"age": 120})));
        assert_eq!(codes(&high), vec![ErrorCode::Max]);
        let bad = validate_submission(&snap, &answers(json!({"age": "forty"})));
        assert_eq!(codes(&bad), vec![ErrorCode::Invalid]);
    }

    // --- select / radio / multiselect ---

    fn color_field(field_type: &str, allow_custom: bool) -> serde_json::Value {
        json!([{
            "name": "color", "type": field_type,
            "props": {
                "options": [{"value": "red"}, {"value": "blue"}],
                "allow_custom": allow_custom
            }
        }])
    }

    #[test]
    fn select_rejects_values_outside_options() {
        let snap = snapshot(color_field("select", false));
        let ok = validate_submission(&snap, &answers(json!({"color": {"value": "red"}})));
        assert!(ok.is_empty());
        let bad = validate_submission(&snap, &answers(json!({"color": {"value": "green"}})));
        assert_eq!(codes(&bad), vec![ErrorCode::NotAllowed]);
    }

    #[test]
    fn select_allow_custom_accepts_anything() {
        let snap = snapshot(color_field("select", true));
        let ok = validate_submission(&snap, &answers(json!({"color": {"value": "chartreuse"}})));
        assert!(ok.is_empty());
    }

    #[test]
    fn radio_ignores_allow_custom() {
        let snap = snapshot(color_field("radio", true));
        let bad = validate_submission(&snap, &answers(json!({"color": {"value": "green"}})));
        assert_eq!(codes(&bad), vec![ErrorCode::NotAllowed]);
    }

    #[test]
    fn multiselect_checks_each_item_with_details() {
        let snap = snapshot(color_field("multiselect", false));
        let errs = validate_submission(
            &snap,
            &answers(json!({"color": [{"value": "red"}, {"value": "green"}, {"value": "pink"}]})),
        );
        assert_eq!(codes(&errs), vec![ErrorCode::NotAllowed, ErrorCode::NotAllowed]);
        assert_eq!(errs[0].details.as_ref().unwrap()["value"], "green");
    }

    // --- email ---

    #[test]
    fn email_is_trimmed_and_lowercased_before_matching() {
        let snap = snapshot(json!([{"name": "email", "type": "email", "props": {}}]));
        let ok = validate_submission(&snap, &answers(json!({"email": "  User@Example.COM "})));
        assert!(ok.is_empty());
        let bad = validate_submission(&snap, &answers(json!({"email": "not-an-email"})));
        assert_eq!(codes(&bad), vec![ErrorCode::InvalidEmail]);
    }

    struct EmptyMx;
    impl MxResolver for EmptyMx {
        fn has_mx(&self, _domain: &str) -> Option<bool> {
            Some(false)
        }
    }

    #[test]
    fn mx_check_reports_no_mx_only_with_affirmative_resolver() {
        let snap = snapshot(json!([
            {"name": "email", "type": "email", "props": {"mx_check": true}}
        ]));
        let ans = answers(json!({"email": "a@dead-domain.example"}));

        // Production wiring: unknown -> soft pass.
        assert!(validate_submission(&snap, &ans).is_empty());

        let errs = validate_submission_with(&snap, &ans, &EmptyMx);
        assert_eq!(codes(&errs), vec![ErrorCode::NoMx]);
    }

    // --- phone ---

    #[test]
    fn phone_e164_enforced_only_when_required() {
        let relaxed = snapshot(json!([{"name": "ph", "type": "phone", "props": {}}]));
        let bad_number = json!({"ph": {"e164": "12345", "country": "SA"}});
        assert!(validate_submission(&relaxed, &answers(bad_number.clone())).is_empty());

        let strict = snapshot(json!([
            {"name": "ph", "type": "phone", "props": {"e164_required": true}}
        ]));
        let errs = validate_submission(&strict, &answers(bad_number));
        assert_eq!(codes(&errs), vec![ErrorCode::E164]);

        let ok = validate_submission(
            &strict,
            &answers(json!({"ph": {"e164": "+966500112233", "country": "SA"}})),
        );
        assert!(ok.is_empty());
    }

    // --- file upload ---

    #[test]
    fn file_upload_limits_and_metadata() {
        let snap = snapshot(json!([
            {"name": "docs", "type": "file_upload", "props": {"max_files": 2}}
        ]));
        let ok = validate_submission(
            &snap,
            &answers(json!({"docs": [{"id": 1, "url": "https://cdn/x"}]})),
        );
        assert!(ok.is_empty());

        let too_many = validate_submission(
            &snap,
            &answers(json!({"docs": [
                {"id": 1, "url": "u"}, {"id": 2, "url": "u"}, {"id": 3, "url": "u"}
            ]})),
        );
        assert_eq!(codes(&too_many), vec![ErrorCode::TooMany]);

        let missing = validate_submission(
            &snap,
            &answers(json!({"docs": [{"id": 1}, {"url": "u"}]})),
        );
        assert_eq!(
            codes(&missing),
            vec![ErrorCode::MissingMeta, ErrorCode::MissingMeta]
        );
    }

    #[test]
    fn file_upload_defaults_to_one_file() {
        let snap = snapshot(json!([
            {"name": "docs", "type": "file_upload", "props": {}}
        ]));
        let errs = validate_submission(
            &snap,
            &answers(json!({"docs": [{"id": 1, "url": "u"}, {"id": 2, "url": "u"}]})),
        );
        assert_eq!(codes(&errs), vec![ErrorCode::TooMany]);
    }

    // --- date/time ---

    #[test]
    fn timestamps_must_parse_as_rfc3339() {
        let snap = snapshot(json!([{"name": "when", "type": "datetime", "props": {}}]));
        let ok = validate_submission(&snap, &answers(json!({"when": "2026-08-29T10:15:00Z"})));
        assert!(ok.is_empty());
        let bad = validate_submission(&snap, &answers(json!({"when": "yesterday"})));
        assert_eq!(codes(&bad), vec![ErrorCode::Invalid]);
    }

    // --- info / unknown / inactive ---

    #[test]
    fn info_and_unknown_fields_never_validate() {
        let snap = snapshot(json!([
            {"name": "banner", "type": "info", "props": {"required": true}},
            {"name": "future", "type": "hologram", "props": {}}
        ]));
        // `info` required-ness still applies when absent; a present value
        // of any shape passes.
        let errs = validate_submission(&snap, &answers(json!({"banner": 1, "future": [1]})));
        assert!(errs.is_empty());
    }

    #[test]
    fn inactive_fields_are_skipped_entirely() {
        let snap = snapshot(json!([
            {"name": "old", "type": "number", "status": "inactive",
             "props": {"required": true}}
        ]));
        assert!(validate_submission(&snap, &answers(json!({}))).is_empty());
    }

    // --- collect-all contract ---

    #[test]
    fn three_independent_violations_yield_three_errors() {
        let snap = snapshot(json!([
            {"name": "a", "type": "text", "props": {"required": true}},
            {"name": "b", "type": "number", "props": {"min": 10}},
            {"name": "c", "type": "email", "props": {}}
        ]));
        let errs = validate_submission(
            &snap,
            &answers(json!({"b": 1, "c": "nope"})),
        );
        assert_eq!(
            codes(&errs),
            vec![ErrorCode::Required, ErrorCode::Min, ErrorCode::InvalidEmail]
        );
    }
}
