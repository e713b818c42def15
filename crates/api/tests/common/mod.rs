//! Shared harness for API integration tests.
//!
//! Mirrors the production wiring (`build_app_router` plus a live dispatch
//! queue) so tests exercise the same middleware stack and the same
//! delivery path the binary uses, just with fast retry timings.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use formgate_api::config::ServerConfig;
use formgate_api::router::build_app_router;
use formgate_api::state::AppState;
use formgate_db::repositories::{FormRepo, WebhookRepo};
use formgate_dispatch::{DispatchConfig, RetryPolicy};

/// Build a test `ServerConfig` with safe defaults and fast webhook retries.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        webhook_signing_key: "test-signing-key".to_string(),
        webhook_timeout_ms: 2000,
        webhook_max_retries: 1,
        webhook_retry_backoff_ms: 10,
        dispatch_queue_capacity: 16,
        dispatch_workers: 2,
    }
}

/// Build the full application router with all middleware layers and a
/// running dispatch worker pool on the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let (dispatch, _workers) = formgate_dispatch::queue::start(
        pool.clone(),
        DispatchConfig {
            signing_key: config.webhook_signing_key.clone(),
            retry: RetryPolicy {
                max_retries: config.webhook_max_retries,
                backoff: Duration::from_millis(config.webhook_retry_backoff_ms),
                timeout: Duration::from_millis(config.webhook_timeout_ms),
            },
            workers: config.dispatch_workers,
            capacity: config.dispatch_queue_capacity,
        },
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        dispatch,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body to the app.
pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect and parse a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status and return the parsed body.
pub async fn assert_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Install a form snapshot the tests can submit against.
pub async fn seed_form(pool: &PgPool, form_id: &str, version: i32, fields: Value, submit: Value) {
    FormRepo::create(
        pool,
        form_id,
        version,
        &fields,
        &submit,
        &serde_json::json!(["en", "ar"]),
    )
    .await
    .expect("seed form");
}

/// Install an enabled webhook for a snapshot.
pub async fn seed_webhook(pool: &PgPool, form_id: &str, version: i32, url: &str) -> i64 {
    let input: formgate_db::models::webhook::CreateWebhook = serde_json::from_value(
        serde_json::json!({
            "form_id": form_id,
            "version": version,
            "endpoint_url": url,
        }),
    )
    .expect("webhook input");
    WebhookRepo::create(pool, &input).await.expect("seed webhook").id
}

/// Poll a submission's webhook status until it leaves `pending` or the
/// deadline passes; returns the last observed value.
pub async fn wait_for_webhook_status(pool: &PgPool, submission_id: i64) -> String {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let status: String =
            sqlx::query_scalar("SELECT webhook_status FROM submissions WHERE id = $1")
                .bind(submission_id)
                .fetch_one(pool)
                .await
                .expect("submission row");
        if status != "pending" || tokio::time::Instant::now() >= deadline {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Count rows in the submissions table.
pub async fn count_submissions(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(pool)
        .await
        .expect("count submissions")
}
