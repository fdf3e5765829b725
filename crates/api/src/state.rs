use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: nextcopy_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation pipeline: theme/post/image runs and their status.
    pub orchestrator: Arc<nextcopy_pipeline::Orchestrator>,
}
