use std::sync::Arc;

use formgate_dispatch::DispatchQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: formgate_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Producer half of the bounded dispatch queue.
    pub dispatch: DispatchQueue,
}
