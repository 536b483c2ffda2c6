//! Route definition for the health check endpoint.

use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// `GET /health`, mounted at the root rather than under `/api/v1` so
/// load balancers can reach it without versioned paths.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}
