use std::sync::Arc;

use scribe_engine::status::StatusQueryService;
use scribe_engine::submit::JobSubmissionService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Write path: creates jobs and dispatches the pipeline.
    pub submission: Arc<JobSubmissionService>,
    /// Read path: serves polls against the registry.
    pub status: Arc<StatusQueryService>,
}
