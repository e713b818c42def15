//! Dedupe-key derivation.
//!
//! When a snapshot's submit policy enables idempotency, the named meta
//! value (commonly a session id) becomes the submission's dedupe key.
//! Uniqueness itself is enforced at persistence time by the submission
//! store's partial unique index.

use serde_json::Value;

use crate::snapshot::SubmitPolicy;

/// Derive the idempotency key for a submission, if any.
///
/// Returns `None` when the policy is disabled, names no key, or the meta
/// value is absent, non-string, or empty — in all of those cases the
/// submission is always stored as new.
pub fn derive_key(policy: &SubmitPolicy, meta: &Value) -> Option<String> {
    let idem = policy.idempotency.as_ref()?;
    if !idem.enabled || idem.key.is_empty() {
        return None;
    }
    match meta.get(&idem.key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
