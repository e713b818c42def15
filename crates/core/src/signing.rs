//! Webhook delivery signatures.
//!
//! Every outbound webhook request carries an `X-Signature` header computed
//! over the exact body bytes transmitted, so receivers can authenticate
//! payloads with the shared signing key.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the HMAC-SHA256 signature for an outbound payload.
///
/// `signing_key` is the process-wide webhook signing secret. `body` is the
/// rendered payload exactly as it will be sent. Returns the hex-encoded
/// signature string.
pub fn sign_payload(signing_key: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(signing_key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    let result = mac.finalize();
    hex::encode(result.into_bytes())
}

/// The `X-Signature` header value: `sha256=<hex>`.
pub fn signature_header(signing_key: &str, body: &[u8]) -> String {
    format!("sha256={}", sign_payload(signing_key, body))
}

// ---------------------------------------------------------------------------
// hex encoding helper (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
