//! Submission rows and DTOs.

use formgate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Aggregate delivery status
// ---------------------------------------------------------------------------

/// Aggregate webhook delivery status for a submission.
///
/// `Pending` at insert; flipped exactly once to `Success` (every enabled
/// webhook delivered) or `Partial` (at least one failed) by the dispatch
/// worker that owns the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    Pending,
    Success,
    Partial,
}

impl WebhookStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WebhookStatus::Pending => "pending",
            WebhookStatus::Success => "success",
            WebhookStatus::Partial => "partial",
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A submission row from the `submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Submission {
    pub id: DbId,
    pub form_id: String,
    pub version: i32,
    /// Client-reported submit time, epoch milliseconds.
    pub submitted_at: i64,
    pub locale: String,
    pub device: Option<String>,
    pub answers_json: serde_json::Value,
    pub attributes_json: serde_json::Value,
    pub idempotency_key: Option<String>,
    pub webhook_status: String,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for inserting a new submission record.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub form_id: String,
    pub version: i32,
    pub submitted_at: i64,
    pub locale: String,
    pub device: Option<String>,
    pub answers: serde_json::Value,
    pub attributes: serde_json::Value,
    pub idempotency_key: Option<String>,
}
