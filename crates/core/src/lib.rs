//! Formgate domain logic.
//!
//! Pure types and functions shared by the database, dispatch, and API
//! layers. Nothing in this crate touches the network or a database:
//!
//! - [`snapshot`] — the versioned form snapshot model (fields, props,
//!   submit policy) decoded once from stored JSON.
//! - [`answers`] — the typed [`AnswerValue`] union decoded from raw
//!   submission answers.
//! - [`validation`] — per-field and whole-submission validation.
//! - [`format`] — human-readable answer formatting for webhook payloads.
//! - [`idempotency`] — dedupe-key derivation from submission metadata.
//! - [`signing`] — HMAC-SHA256 delivery signatures.

pub mod answers;
pub mod error;
pub mod format;
pub mod idempotency;
pub mod signing;
pub mod snapshot;
pub mod types;
pub mod validation;

pub use answers::{AnswerMap, AnswerValue};
pub use error::CoreError;
pub use snapshot::{FieldSchema, FieldType, FormSnapshot, SubmitPolicy};
pub use validation::{validate_submission, FieldError};
