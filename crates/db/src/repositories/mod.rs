//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod form_repo;
pub mod submission_repo;
pub mod webhook_repo;

pub use form_repo::FormRepo;
pub use submission_repo::SubmissionRepo;
pub use webhook_repo::WebhookRepo;
