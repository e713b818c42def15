//! Per-submission webhook fan-out.
//!
//! A dispatch worker calls [`dispatch_submission`] for one accepted
//! submission: it reloads the snapshot and submission row, renders and
//! delivers the payload to every enabled webhook of that form version in
//! id order, then records the aggregate status on the submission row.

use formgate_core::answers::AnswerMap;
use formgate_core::error::CoreError;
use formgate_db::models::submission::WebhookStatus;
use formgate_db::repositories::{FormRepo, SubmissionRepo, WebhookRepo};
use formgate_db::DbPool;

use crate::queue::DispatchJob;
use crate::render::{render_payload, RenderInput};
use crate::sender::WebhookSender;

/// Error type for dispatch failures that abort the whole submission (a
/// single webhook failing is an outcome, not an error).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Submission {0} not found")]
    SubmissionGone(i64),

    #[error("Form snapshot {form_id} v{version} not found")]
    SnapshotGone { form_id: String, version: i32 },
}

/// Deliver one accepted submission to all of its enabled webhooks and
/// record the aggregate result. Status moves from `pending` to `success`
/// only when every webhook delivered; any failure yields `partial`.
pub async fn dispatch_submission(
    pool: &DbPool,
    sender: &WebhookSender,
    job: &DispatchJob,
) -> Result<(), DispatchError> {
    let snapshot = FormRepo::find(pool, &job.form_id, job.version)
        .await?
        .ok_or_else(|| DispatchError::SnapshotGone {
            form_id: job.form_id.clone(),
            version: job.version,
        })?
        .into_snapshot()?;

    let submission = SubmissionRepo::find_by_id(pool, job.submission_id)
        .await?
        .ok_or(DispatchError::SubmissionGone(job.submission_id))?;

    let webhooks = WebhookRepo::list_enabled(pool, &job.form_id, job.version).await?;
    if webhooks.is_empty() {
        // Nothing to deliver counts as fully delivered.
        SubmissionRepo::set_webhook_status(pool, submission.id, WebhookStatus::Success).await?;
        return Ok(());
    }

    let answers = AnswerMap::from_json(&submission.answers_json);
    let input = RenderInput {
        submission_id: submission.id,
        submitted_at: submission.submitted_at,
        locale: &submission.locale,
        device: submission.device.as_deref().unwrap_or_default(),
        meta: &job.meta,
        answers: &answers,
        snapshot: &snapshot,
    };

    let mut delivered = 0usize;
    for webhook in &webhooks {
        let body = render_payload(&input, webhook);
        let outcome = sender.deliver(webhook, &body).await;
        if outcome.success {
            delivered += 1;
        }
    }

    let status = if delivered == webhooks.len() {
        WebhookStatus::Success
    } else {
        WebhookStatus::Partial
    };
    SubmissionRepo::set_webhook_status(pool, submission.id, status).await?;

    tracing::info!(
        submission_id = submission.id,
        form_id = %job.form_id,
        version = job.version,
        delivered,
        total = webhooks.len(),
        status = status.as_str(),
        "webhook dispatch finished"
    );
    Ok(())
}
