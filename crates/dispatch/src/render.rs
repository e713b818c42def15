//! Payload rendering for webhook deliveries.
//!
//! A webhook either carries a Handlebars body template or falls back to the
//! canonical default payload: an ordered array of `{question, answer}` rows
//! in schema order, with answers formatted for the submission locale.

use std::collections::BTreeMap;

use formgate_core::answers::{AnswerMap, AnswerValue};
use formgate_core::format::{format_answer, QuestionAnswer};
use formgate_core::snapshot::FormSnapshot;
use formgate_core::types::DbId;
use formgate_db::models::webhook::FormWebhook;
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, HelperResult, Output,
    RenderContext, RenderErrorReason,
};
use serde_json::{json, Value};

/// Everything the renderer needs to know about one accepted submission.
#[derive(Debug)]
pub struct RenderInput<'a> {
    pub submission_id: DbId,
    pub submitted_at: i64,
    pub locale: &'a str,
    pub device: &'a str,
    pub meta: &'a Value,
    pub answers: &'a AnswerMap,
    pub snapshot: &'a FormSnapshot,
}

/// Render the request body for one webhook. Rendering never fails the
/// dispatch: a template that cannot be parsed or executed degrades to `{}`
/// and is logged, so a bad template does not block the remaining webhooks.
pub fn render_payload(input: &RenderInput<'_>, webhook: &FormWebhook) -> Vec<u8> {
    let selected = selected_answers(input.answers, &webhook.selected_fields());

    match webhook.body_template.as_deref() {
        Some(tpl) if !tpl.trim().is_empty() => render_template(input, &selected, tpl),
        _ => default_payload(input, &selected),
    }
}

// ---------------------------------------------------------------------------
// Field selection
// ---------------------------------------------------------------------------

/// Answers this webhook is allowed to see, as template-ready JSON values.
/// An empty selection means every answered field.
fn selected_answers(answers: &AnswerMap, selection: &[String]) -> BTreeMap<String, Value> {
    answers
        .iter()
        .filter(|(name, _)| selection.is_empty() || selection.iter().any(|s| s == *name))
        .map(|(name, value)| (name.clone(), value.to_template_value()))
        .collect()
}

// ---------------------------------------------------------------------------
// Template path
// ---------------------------------------------------------------------------

handlebars_helper!(json_helper: |v: Json| serde_json::to_string(v).unwrap_or_default());

/// `{{formatAnswer x}}` renders an answer value the same way the default
/// payload does, using the submission locale.
struct FormatAnswerHelper {
    locale: String,
}

impl HelperDef for FormatAnswerHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let raw = h
            .param(0)
            .map(|p| p.value().clone())
            .ok_or_else(|| RenderErrorReason::ParamNotFoundForIndex("formatAnswer", 0))?;
        out.write(&format_answer(&AnswerValue::from_json(&raw), &self.locale))?;
        Ok(())
    }
}

fn render_template(
    input: &RenderInput<'_>,
    selected: &BTreeMap<String, Value>,
    template: &str,
) -> Vec<u8> {
    let mut hb = Handlebars::new();
    // Templates produce JSON or arbitrary HTTP bodies, never HTML.
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_helper("json", Box::new(json_helper));
    hb.register_helper(
        "formatAnswer",
        Box::new(FormatAnswerHelper {
            locale: input.locale.to_string(),
        }),
    );

    let mut ctx = serde_json::Map::new();
    ctx.insert("formId".into(), json!(input.snapshot.form_id));
    ctx.insert("version".into(), json!(input.snapshot.version));
    ctx.insert("submissionId".into(), json!(input.submission_id));
    ctx.insert("submittedAt".into(), json!(input.submitted_at));
    ctx.insert("locale".into(), json!(input.locale));
    ctx.insert("device".into(), json!(input.device));
    ctx.insert("sessionId".into(), json!(meta_str(input.meta, "sessionId")));
    ctx.insert("meta".into(), input.meta.clone());
    ctx.insert(
        "answers".into(),
        Value::Object(
            input
                .answers
                .iter()
                .map(|(name, value)| (name.clone(), value.to_template_value()))
                .collect(),
        ),
    );
    ctx.insert(
        "selected".into(),
        Value::Object(selected.clone().into_iter().collect()),
    );
    ctx.insert(
        "fieldLabels".into(),
        json!(input.snapshot.field_labels(input.locale)),
    );
    // Each selected answer is also reachable as a top-level variable, unless
    // the field name would shadow one of the fixed keys above.
    for (name, value) in selected {
        ctx.entry(name.clone()).or_insert_with(|| value.clone());
    }

    match hb.render_template(template, &Value::Object(ctx)) {
        Ok(body) => body.into_bytes(),
        Err(err) => {
            tracing::warn!(
                form_id = %input.snapshot.form_id,
                version = input.snapshot.version,
                error = %err,
                "webhook body template failed to render, sending empty object"
            );
            b"{}".to_vec()
        }
    }
}

// ---------------------------------------------------------------------------
// Default payload
// ---------------------------------------------------------------------------

/// The canonical default payload: submission identity plus an ordered array
/// of question/answer rows. Active fields in schema order first, then any
/// answered fields the snapshot does not know about, in name order. An
/// answer for an inactive schema field is never rendered.
fn default_payload(input: &RenderInput<'_>, selected: &BTreeMap<String, Value>) -> Vec<u8> {
    let mut rows: Vec<QuestionAnswer> = Vec::with_capacity(selected.len());

    for field in input.snapshot.active_fields() {
        if !selected.contains_key(&field.name) {
            continue;
        }
        if let Some(value) = input.answers.get(&field.name) {
            rows.push(QuestionAnswer {
                question: field.label_for(input.locale).to_string(),
                answer: format_answer(value, input.locale),
            });
        }
    }
    for (name, _) in selected {
        if input.snapshot.fields.iter().any(|f| f.name == *name) {
            continue;
        }
        if let Some(value) = input.answers.get(name) {
            rows.push(QuestionAnswer {
                question: name.clone(),
                answer: format_answer(value, input.locale),
            });
        }
    }

    let mut payload = json!({
        "formId": input.snapshot.form_id,
        "version": input.snapshot.version,
        "submissionId": input.submission_id,
        "submittedAt": input.submitted_at,
        "locale": input.locale,
        "answers": rows,
    });
    if !input.device.is_empty() {
        payload["device"] = json!(input.device);
    }
    if let Some(session) = non_empty(meta_str(input.meta, "sessionId")) {
        payload["sessionId"] = json!(session);
    }

    serde_json::to_vec(&payload).unwrap_or_else(|_| b"{}".to_vec())
}

fn meta_str<'a>(meta: &'a Value, key: &str) -> &'a str {
    meta.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> FormSnapshot {
        FormSnapshot::from_stored(
            "contact".into(),
            3,
            &json!([
                {"name": "name", "type": "text", "label": {"en": "Your name", "ar": "اسمك"}},
                {"name": "color", "type": "radio", "label": {"en": "Favourite colour"},
                 "props": {"options": [{"value": "red"}, {"value": "other"}], "allow_custom": true}},
                {"name": "hidden", "type": "text", "status": "inactive"},
            ]),
            &json!({}),
            &json!(["en", "ar"]),
        )
        .unwrap()
    }

    fn webhook(template: Option<&str>, selected: Option<Value>) -> FormWebhook {
        FormWebhook {
            id: 1,
            form_id: "contact".into(),
            version: 3,
            webhook_type: "http".into(),
            endpoint_url: "http://example.invalid/hook".into(),
            http_method: String::new(),
            content_type: String::new(),
            headers_json: json!({}),
            body_template: template.map(str::to_string),
            selected_fields_json: selected,
            mode: "live".into(),
            enabled: true,
        }
    }

    fn input<'a>(answers: &'a AnswerMap, snapshot: &'a FormSnapshot, meta: &'a Value) -> RenderInput<'a> {
        RenderInput {
            submission_id: 42,
            submitted_at: 1_700_000_000_000,
            locale: "en",
            device: "mobile",
            meta,
            answers,
            snapshot,
        }
    }

    #[test]
    fn default_payload_is_ordered_question_answer_rows() {
        let snap = snapshot();
        let answers = AnswerMap::from_json(&json!({
            "color": {"value": "other", "other": "teal"},
            "name": "Lina",
        }));
        let meta = json!({"sessionId": "s-1"});

        let body = render_payload(&input(&answers, &snap, &meta), &webhook(None, None));
        let payload: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(payload["formId"], "contact");
        assert_eq!(payload["submissionId"], 42);
        assert_eq!(payload["device"], "mobile");
        assert_eq!(payload["sessionId"], "s-1");
        // schema order, not answer-map order
        assert_eq!(
            payload["answers"],
            json!([
                {"question": "Your name", "answer": "Lina"},
                {"question": "Favourite colour", "answer": "teal"},
            ])
        );
    }

    #[test]
    fn default_payload_appends_unknown_fields_after_schema_fields() {
        let snap = snapshot();
        let answers = AnswerMap::from_json(&json!({"extra": "x", "name": "Lina"}));
        let meta = json!({});

        let body = render_payload(&input(&answers, &snap, &meta), &webhook(None, None));
        let payload: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(
            payload["answers"],
            json!([
                {"question": "Your name", "answer": "Lina"},
                {"question": "extra", "answer": "x"},
            ])
        );
    }

    #[test]
    fn inactive_field_answers_are_never_rendered() {
        let snap = snapshot();
        let answers = AnswerMap::from_json(&json!({
            "name": "Lina",
            "hidden": "secret",
            "extra": "x",
        }));
        let meta = json!({});

        let body = render_payload(&input(&answers, &snap, &meta), &webhook(None, None));
        let payload: Value = serde_json::from_slice(&body).unwrap();

        // `hidden` is a deactivated schema field; only truly unknown names
        // fall through to the catch-all.
        assert_eq!(
            payload["answers"],
            json!([
                {"question": "Your name", "answer": "Lina"},
                {"question": "extra", "answer": "x"},
            ])
        );
    }

    #[test]
    fn selected_fields_restrict_the_default_payload() {
        let snap = snapshot();
        let answers = AnswerMap::from_json(&json!({"name": "Lina", "color": {"value": "red"}}));
        let meta = json!({});

        let body = render_payload(
            &input(&answers, &snap, &meta),
            &webhook(None, Some(json!(["color"]))),
        );
        let payload: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(
            payload["answers"],
            json!([{"question": "Favourite colour", "answer": "red"}])
        );
    }

    #[test]
    fn template_sees_top_level_fields_and_helpers() {
        let snap = snapshot();
        let answers = AnswerMap::from_json(&json!({
            "name": "Lina",
            "color": {"value": "other", "other": "teal"},
        }));
        let meta = json!({"sessionId": "s-9"});

        let body = render_payload(
            &input(&answers, &snap, &meta),
            &webhook(
                Some(r#"{"who": {{json name}}, "picked": "{{formatAnswer color}}", "sid": "{{sessionId}}"}"#),
                None,
            ),
        );
        let payload: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(payload["who"], "Lina");
        assert_eq!(payload["picked"], "teal");
        assert_eq!(payload["sid"], "s-9");
    }

    #[test]
    fn broken_template_degrades_to_empty_object() {
        let snap = snapshot();
        let answers = AnswerMap::from_json(&json!({"name": "Lina"}));
        let meta = json!({});

        let body = render_payload(
            &input(&answers, &snap, &meta),
            &webhook(Some("{{#if name}}unclosed"), None),
        );
        assert_eq!(body, b"{}");
    }

    #[test]
    fn arabic_locale_formats_answers_and_labels() {
        let snap = snapshot();
        let answers = AnswerMap::from_json(&json!({"name": "لينا"}));
        let meta = json!({});
        let render_input = RenderInput {
            locale: "ar",
            ..input(&answers, &snap, &meta)
        };

        let body = render_payload(&render_input, &webhook(None, None));
        let payload: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(
            payload["answers"],
            json!([{"question": "اسمك", "answer": "لينا"}])
        );
    }
}
