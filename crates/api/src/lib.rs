//! Scribe API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes)
//! so integration tests and the binary entrypoint can both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

use axum::Router;

use state::AppState;

/// Build the full application router: health at the root, the versioned
/// API under `/api/v1`, shared state attached. Middleware layers are
/// applied by the binary so tests exercise the same routes without the
/// timeout/CORS stack.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_bytes as usize + 64 * 1024,
        ))
        .with_state(state)
}
