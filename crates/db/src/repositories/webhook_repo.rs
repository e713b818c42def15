//! Repository for the `form_webhooks` table.

use sqlx::PgPool;

use crate::models::webhook::{CreateWebhook, FormWebhook};

const WEBHOOK_COLUMNS: &str = "\
    id, form_id, version, type, endpoint_url, http_method, content_type, \
    headers_json, body_template, selected_fields_json, mode, enabled";

/// Read/write access to webhook configuration.
pub struct WebhookRepo;

impl WebhookRepo {
    /// List the enabled webhooks for one snapshot, in id order. Dispatch
    /// processes them sequentially in exactly this order.
    pub async fn list_enabled(
        pool: &PgPool,
        form_id: &str,
        version: i32,
    ) -> Result<Vec<FormWebhook>, sqlx::Error> {
        let query = format!(
            "SELECT {WEBHOOK_COLUMNS} FROM form_webhooks \
             WHERE form_id = $1 AND version = $2 AND enabled \
             ORDER BY id"
        );
        sqlx::query_as::<_, FormWebhook>(&query)
            .bind(form_id)
            .bind(version)
            .fetch_all(pool)
            .await
    }

    /// Create a webhook configuration row.
    pub async fn create(pool: &PgPool, input: &CreateWebhook) -> Result<FormWebhook, sqlx::Error> {
        let headers_json =
            serde_json::to_value(&input.headers).unwrap_or(serde_json::Value::Null);
        let selected_fields_json = input
            .selected_fields
            .as_ref()
            .map(|f| serde_json::to_value(f).unwrap_or(serde_json::Value::Null));
        let query = format!(
            "INSERT INTO form_webhooks \
                 (form_id, version, type, endpoint_url, http_method, content_type, \
                  headers_json, body_template, selected_fields_json, mode, enabled) \
             VALUES ($1, $2, $3, $4, \
                     COALESCE($5, 'POST'), COALESCE($6, 'application/json'), \
                     $7, $8, $9, $10, $11) \
             RETURNING {WEBHOOK_COLUMNS}"
        );
        sqlx::query_as::<_, FormWebhook>(&query)
            .bind(&input.form_id)
            .bind(input.version)
            .bind(&input.webhook_type)
            .bind(&input.endpoint_url)
            .bind(&input.http_method)
            .bind(&input.content_type)
            .bind(headers_json)
            .bind(&input.body_template)
            .bind(selected_fields_json)
            .bind(&input.mode)
            .bind(input.enabled)
            .fetch_one(pool)
            .await
    }
}
