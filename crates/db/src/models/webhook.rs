//! Webhook configuration rows.

use std::collections::BTreeMap;

use formgate_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A webhook configuration row from `form_webhooks`. Belongs to exactly
/// one `(form_id, version)` snapshot.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormWebhook {
    pub id: DbId,
    pub form_id: String,
    pub version: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub webhook_type: String,
    pub endpoint_url: String,
    pub http_method: String,
    pub content_type: String,
    pub headers_json: serde_json::Value,
    pub body_template: Option<String>,
    pub selected_fields_json: Option<serde_json::Value>,
    pub mode: String,
    pub enabled: bool,
}

impl FormWebhook {
    /// HTTP method to use, defaulting to POST when the row is empty.
    pub fn method(&self) -> &str {
        if self.http_method.is_empty() {
            "POST"
        } else {
            &self.http_method
        }
    }

    /// Content type to send, defaulting to application/json.
    pub fn content_type(&self) -> &str {
        if self.content_type.is_empty() {
            "application/json"
        } else {
            &self.content_type
        }
    }

    /// Custom headers decoded from `headers_json`. Malformed JSON decodes
    /// to an empty map rather than failing the dispatch.
    pub fn headers(&self) -> BTreeMap<String, String> {
        serde_json::from_value(self.headers_json.clone()).unwrap_or_default()
    }

    /// Field names this webhook is restricted to. Empty means all fields.
    pub fn selected_fields(&self) -> Vec<String> {
        self.selected_fields_json
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}

/// Input for creating a webhook configuration row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWebhook {
    pub form_id: String,
    pub version: i32,
    #[serde(rename = "type", default = "default_type")]
    pub webhook_type: String,
    pub endpoint_url: String,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body_template: Option<String>,
    #[serde(default)]
    pub selected_fields: Option<Vec<String>>,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_type() -> String {
    "http".into()
}

fn default_mode() -> String {
    "live".into()
}

fn default_enabled() -> bool {
    true
}
