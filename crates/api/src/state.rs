use std::sync::Arc;

use personafy_pipeline::transform::TransformPipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: personafy_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Transform pipeline with its store and generator already wired.
    pub pipeline: Arc<TransformPipeline>,
}
