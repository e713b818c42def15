pub mod health;
pub mod submissions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /submissions    POST    submission intake
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/submissions", submissions::router())
}
