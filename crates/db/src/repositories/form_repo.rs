//! Repository for the `forms` snapshot table.
//!
//! This service only reads snapshots; they are published by the admin
//! surface. `create` exists so tests and seed scripts can install one.

use sqlx::PgPool;

use crate::models::form::FormRow;

const FORM_COLUMNS: &str = "\
    form_id, version, fields_json, submit_json, supported_locales_json, created_at";

/// Read access to published form snapshots.
pub struct FormRepo;

impl FormRepo {
    /// Find one snapshot by `(form_id, version)`.
    pub async fn find(
        pool: &PgPool,
        form_id: &str,
        version: i32,
    ) -> Result<Option<FormRow>, sqlx::Error> {
        let query = format!("SELECT {FORM_COLUMNS} FROM forms WHERE form_id = $1 AND version = $2");
        sqlx::query_as::<_, FormRow>(&query)
            .bind(form_id)
            .bind(version)
            .fetch_optional(pool)
            .await
    }

    /// Install a snapshot. Used by tests and seed tooling; the admin
    /// surface that owns publication lives outside this service.
    pub async fn create(
        pool: &PgPool,
        form_id: &str,
        version: i32,
        fields_json: &serde_json::Value,
        submit_json: &serde_json::Value,
        supported_locales_json: &serde_json::Value,
    ) -> Result<FormRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO forms (form_id, version, fields_json, submit_json, supported_locales_json) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {FORM_COLUMNS}"
        );
        sqlx::query_as::<_, FormRow>(&query)
            .bind(form_id)
            .bind(version)
            .bind(fields_json)
            .bind(submit_json)
            .bind(supported_locales_json)
            .fetch_one(pool)
            .await
    }
}
