//! Signed webhook delivery with fixed-backoff retry.
//!
//! [`WebhookSender`] sends a rendered payload to one webhook endpoint. Failed
//! attempts are retried up to the configured count with a fixed delay between
//! attempts; each attempt has its own request timeout.

use std::time::Duration;

use formgate_core::signing::signature_header;
use formgate_db::models::webhook::FormWebhook;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;

/// Retry and timeout knobs, taken from server configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt, so `max_retries + 1` attempts total.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
    /// Per-attempt request timeout.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(1500),
            timeout: Duration::from_millis(8000),
        }
    }
}

/// The terminal result of delivering one payload to one webhook.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub webhook_id: i64,
    pub success: bool,
    /// Status of the last attempt, if a response was received at all.
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

/// Error type for a single delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// WebhookSender
// ---------------------------------------------------------------------------

/// Delivers signed payloads to webhook endpoints.
pub struct WebhookSender {
    client: reqwest::Client,
    policy: RetryPolicy,
    signing_key: String,
}

impl WebhookSender {
    /// Create a sender with a pre-configured HTTP client.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized, which is fatal at
    /// startup anyway.
    pub fn new(signing_key: String, policy: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .timeout(policy.timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            policy,
            signing_key,
        }
    }

    /// Deliver `body` to one webhook, retrying on any failure.
    ///
    /// Never returns an error: the caller aggregates outcomes across all
    /// webhooks of a submission, so failures are data, not control flow.
    pub async fn deliver(&self, webhook: &FormWebhook, body: &[u8]) -> DeliveryOutcome {
        let headers = self.build_headers(webhook, body);
        let method = Method::from_bytes(webhook.method().as_bytes()).unwrap_or(Method::POST);

        let mut last_status: Option<u16> = None;
        let mut last_error: Option<String> = None;

        for attempt in 0..=self.policy.max_retries {
            match self.try_send(webhook, method.clone(), &headers, body).await {
                Ok(status) => {
                    return DeliveryOutcome {
                        webhook_id: webhook.id,
                        success: true,
                        status_code: Some(status),
                        error: None,
                    };
                }
                Err(e) => {
                    if let SendError::HttpStatus(status) = e {
                        last_status = Some(status);
                    }
                    tracing::warn!(
                        webhook_id = webhook.id,
                        url = %webhook.endpoint_url,
                        attempt = attempt + 1,
                        error = %e,
                        "webhook delivery attempt failed"
                    );
                    last_error = Some(e.to_string());
                    if attempt < self.policy.max_retries {
                        tokio::time::sleep(self.policy.backoff).await;
                    }
                }
            }
        }

        tracing::error!(
            webhook_id = webhook.id,
            url = %webhook.endpoint_url,
            "webhook delivery failed after all retries"
        );
        DeliveryOutcome {
            webhook_id: webhook.id,
            success: false,
            status_code: last_status,
            error: last_error,
        }
    }

    /// Execute a single request and check the response status. The response
    /// body is drained and discarded so the connection can be reused.
    async fn try_send(
        &self,
        webhook: &FormWebhook,
        method: Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<u16, SendError> {
        let response = self
            .client
            .request(method, &webhook.endpoint_url)
            .headers(headers.clone())
            .body(body.to_vec())
            .send()
            .await?;
        let status = response.status();
        let _ = response.bytes().await;
        if !status.is_success() {
            return Err(SendError::HttpStatus(status.as_u16()));
        }
        Ok(status.as_u16())
    }

    /// Standard delivery headers, then the webhook's custom headers on top.
    /// A custom header with a standard name replaces it.
    fn build_headers(&self, webhook: &FormWebhook, body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(webhook.content_type()) {
            headers.insert(CONTENT_TYPE, v);
        }
        insert_header(&mut headers, "x-form-id", &webhook.form_id);
        insert_header(&mut headers, "x-form-version", &webhook.version.to_string());
        insert_header(
            &mut headers,
            "x-signature",
            &signature_header(&self.signing_key, body),
        );
        for (name, value) in webhook.headers() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(n), Ok(v)) => {
                    headers.insert(n, v);
                }
                _ => {
                    tracing::warn!(
                        webhook_id = webhook.id,
                        header = %name,
                        "skipping invalid custom webhook header"
                    );
                }
            }
        }
        headers
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(v) = HeaderValue::from_str(value) {
        headers.insert(HeaderName::from_static(name), v);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
