//! Submission intake handler.
//!
//! Validates the submission against its form snapshot, stores it (at most
//! once per idempotency key), and hands it to the dispatch queue. The
//! caller is acked before webhook delivery completes.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use formgate_core::answers::AnswerMap;
use formgate_core::error::CoreError;
use formgate_core::idempotency::derive_key;
use formgate_core::validate_submission;
use formgate_db::models::submission::NewSubmission;
use formgate_db::repositories::{FormRepo, SubmissionRepo};
use formgate_dispatch::DispatchJob;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Incoming submission body.
///
/// `meta` is kept as raw JSON: besides the known keys (`locale`, `device`,
/// `sessionId`, `attributes`) it may carry the value named by the form's
/// idempotency policy.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub form_id: String,
    pub version: i32,
    /// Client-reported submit time, epoch milliseconds. Defaults to now.
    #[serde(default)]
    pub submitted_at: Option<i64>,
    pub answers: Value,
    #[serde(default)]
    pub meta: Value,
}

/// POST /api/v1/submissions
///
/// Validate, persist, and enqueue one submission. Replays of the same
/// idempotency key return the stored row without re-dispatching.
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> AppResult<Json<Value>> {
    let snapshot = FormRepo::find(&state.pool, &req.form_id, req.version)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::UnknownForm {
                form_id: req.form_id.clone(),
                version: req.version,
            })
        })?
        .into_snapshot()?;

    let answers = AnswerMap::from_json(&req.answers);
    let errors = validate_submission(&snapshot, &answers);
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let submitted_at = req
        .submitted_at
        .unwrap_or_else(|| Utc::now().timestamp_millis());
    let locale = match req.meta.get("locale").and_then(Value::as_str) {
        Some(l) if snapshot.supported_locales.iter().any(|s| s == l) => l.to_string(),
        _ => snapshot.default_locale.clone(),
    };
    let device = req
        .meta
        .get("device")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    let attributes = req
        .meta
        .get("attributes")
        .cloned()
        .unwrap_or(Value::Null);
    let idempotency_key = derive_key(&snapshot.submit, &req.meta);

    let new = NewSubmission {
        form_id: req.form_id.clone(),
        version: req.version,
        submitted_at,
        locale,
        device,
        answers: req.answers.clone(),
        attributes,
        idempotency_key,
    };
    let (submission, idempotent) = SubmissionRepo::insert_or_existing(&state.pool, &new).await?;

    if idempotent {
        tracing::info!(
            submission_id = submission.id,
            form_id = %req.form_id,
            version = req.version,
            "idempotent replay, returning stored submission"
        );
        return Ok(Json(json!({
            "id": submission.id,
            "webhookStatus": submission.webhook_status,
            "idempotent": true,
        })));
    }

    state.dispatch.enqueue(DispatchJob {
        submission_id: submission.id,
        form_id: req.form_id.clone(),
        version: req.version,
        meta: req.meta,
    });

    tracing::info!(
        submission_id = submission.id,
        form_id = %req.form_id,
        version = req.version,
        "submission accepted"
    );
    Ok(Json(json!({
        "ok": true,
        "id": submission.id,
        "submissionId": submission.id,
    })))
}
