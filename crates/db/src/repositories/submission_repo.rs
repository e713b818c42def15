//! Repository for the `submissions` table.

use formgate_core::types::DbId;
use sqlx::PgPool;

use crate::models::submission::{NewSubmission, Submission, WebhookStatus};

const SUBMISSION_COLUMNS: &str = "\
    id, form_id, version, submitted_at, locale, device, answers_json, \
    attributes_json, idempotency_key, webhook_status, created_at";

/// Persistence for accepted submissions, including idempotent insert.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a submission, or return the existing row when the dedupe key
    /// collides.
    ///
    /// With an idempotency key, the insert races through the partial
    /// unique index on `(form_id, version, idempotency_key)`: a conflict
    /// inserts nothing and the existing row is read back with the second
    /// tuple element set to `true`. Without a key every call creates a
    /// new row.
    pub async fn insert_or_existing(
        pool: &PgPool,
        new: &NewSubmission,
    ) -> Result<(Submission, bool), sqlx::Error> {
        match &new.idempotency_key {
            Some(key) => {
                let query = format!(
                    "INSERT INTO submissions \
                         (form_id, version, submitted_at, locale, device, \
                          answers_json, attributes_json, idempotency_key) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                     ON CONFLICT (form_id, version, idempotency_key) \
                         WHERE idempotency_key IS NOT NULL \
                         DO NOTHING \
                     RETURNING {SUBMISSION_COLUMNS}"
                );
                let inserted = sqlx::query_as::<_, Submission>(&query)
                    .bind(&new.form_id)
                    .bind(new.version)
                    .bind(new.submitted_at)
                    .bind(&new.locale)
                    .bind(&new.device)
                    .bind(&new.answers)
                    .bind(&new.attributes)
                    .bind(key)
                    .fetch_optional(pool)
                    .await?;

                match inserted {
                    Some(row) => Ok((row, false)),
                    None => {
                        let query = format!(
                            "SELECT {SUBMISSION_COLUMNS} FROM submissions \
                             WHERE form_id = $1 AND version = $2 AND idempotency_key = $3"
                        );
                        let existing = sqlx::query_as::<_, Submission>(&query)
                            .bind(&new.form_id)
                            .bind(new.version)
                            .bind(key)
                            .fetch_one(pool)
                            .await?;
                        Ok((existing, true))
                    }
                }
            }
            None => {
                let query = format!(
                    "INSERT INTO submissions \
                         (form_id, version, submitted_at, locale, device, \
                          answers_json, attributes_json) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) \
                     RETURNING {SUBMISSION_COLUMNS}"
                );
                let row = sqlx::query_as::<_, Submission>(&query)
                    .bind(&new.form_id)
                    .bind(new.version)
                    .bind(new.submitted_at)
                    .bind(&new.locale)
                    .bind(&new.device)
                    .bind(&new.answers)
                    .bind(&new.attributes)
                    .fetch_one(pool)
                    .await?;
                Ok((row, false))
            }
        }
    }

    /// Find a submission by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1");
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record the aggregate delivery status for one submission.
    ///
    /// Always targets the row by primary key so concurrent submissions to
    /// the same form/version can never claim each other's status.
    pub async fn set_webhook_status(
        pool: &PgPool,
        id: DbId,
        status: WebhookStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE submissions SET webhook_status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }
}
