//! Form snapshot rows.

use formgate_core::error::CoreError;
use formgate_core::snapshot::FormSnapshot;
use formgate_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A published form snapshot as stored in the `forms` table. The JSON
/// columns are written by the admin surface and decoded into typed core
/// structures via [`FormRow::into_snapshot`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormRow {
    pub form_id: String,
    pub version: i32,
    pub fields_json: serde_json::Value,
    pub submit_json: serde_json::Value,
    pub supported_locales_json: serde_json::Value,
    pub created_at: Timestamp,
}

impl FormRow {
    /// Decode the stored JSON columns into a typed [`FormSnapshot`].
    pub fn into_snapshot(self) -> Result<FormSnapshot, CoreError> {
        FormSnapshot::from_stored(
            self.form_id,
            self.version,
            &self.fields_json,
            &self.submit_json,
            &self.supported_locales_json,
        )
    }
}
