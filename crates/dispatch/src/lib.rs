//! Webhook delivery for accepted submissions.
//!
//! Submissions are handed to a bounded in-process queue at intake time and
//! picked up by a small pool of workers. Each worker renders the payload for
//! every enabled webhook of the form version, signs it, delivers it with
//! bounded retries, and records the aggregate outcome on the submission row.

pub mod dispatcher;
pub mod queue;
pub mod render;
pub mod sender;

pub use dispatcher::dispatch_submission;
pub use queue::{DispatchConfig, DispatchJob, DispatchQueue, DispatchWorkers};
pub use render::RenderInput;
pub use sender::{DeliveryOutcome, RetryPolicy, WebhookSender};
