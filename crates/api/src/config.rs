use std::time::Duration;

use formgate_dispatch::RetryPolicy;

/// Server configuration loaded from environment variables.
///
/// All fields except the signing key have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`). Bounds the
    /// dispatch queue drain.
    pub shutdown_timeout_secs: u64,
    /// HMAC key for webhook payload signatures.
    pub webhook_signing_key: String,
    /// Per-attempt webhook request timeout in milliseconds (default: `8000`).
    pub webhook_timeout_ms: u64,
    /// Webhook retries after the first attempt (default: `3`).
    pub webhook_max_retries: u32,
    /// Fixed delay between webhook attempts in milliseconds (default: `1500`).
    pub webhook_retry_backoff_ms: u64,
    /// Bounded dispatch queue capacity (default: `256`).
    pub dispatch_queue_capacity: usize,
    /// Dispatch worker task count (default: `4`).
    pub dispatch_workers: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`    | `30`                    |
    /// | `WEBHOOK_SIGNING_KEY`      | required                |
    /// | `WEBHOOK_TIMEOUT_MS`       | `8000`                  |
    /// | `WEBHOOK_MAX_RETRIES`      | `3`                     |
    /// | `WEBHOOK_RETRY_BACKOFF_MS` | `1500`                  |
    /// | `DISPATCH_QUEUE_CAPACITY`  | `256`                   |
    /// | `DISPATCH_WORKERS`         | `4`                     |
    ///
    /// # Panics
    ///
    /// Panics on missing required variables or malformed values; startup
    /// misconfiguration should fail fast.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let webhook_signing_key =
            std::env::var("WEBHOOK_SIGNING_KEY").expect("WEBHOOK_SIGNING_KEY must be set");

        let webhook_timeout_ms: u64 = std::env::var("WEBHOOK_TIMEOUT_MS")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("WEBHOOK_TIMEOUT_MS must be a valid u64");

        let webhook_max_retries: u32 = std::env::var("WEBHOOK_MAX_RETRIES")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("WEBHOOK_MAX_RETRIES must be a valid u32");

        let webhook_retry_backoff_ms: u64 = std::env::var("WEBHOOK_RETRY_BACKOFF_MS")
            .unwrap_or_else(|_| "1500".into())
            .parse()
            .expect("WEBHOOK_RETRY_BACKOFF_MS must be a valid u64");

        let dispatch_queue_capacity: usize = std::env::var("DISPATCH_QUEUE_CAPACITY")
            .unwrap_or_else(|_| "256".into())
            .parse()
            .expect("DISPATCH_QUEUE_CAPACITY must be a valid usize");

        let dispatch_workers: usize = std::env::var("DISPATCH_WORKERS")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("DISPATCH_WORKERS must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            webhook_signing_key,
            webhook_timeout_ms,
            webhook_max_retries,
            webhook_retry_backoff_ms,
            dispatch_queue_capacity,
            dispatch_workers,
        }
    }

    /// Webhook retry knobs in the shape the dispatch crate expects.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.webhook_max_retries,
            backoff: Duration::from_millis(self.webhook_retry_backoff_ms),
            timeout: Duration::from_millis(self.webhook_timeout_ms),
        }
    }
}
