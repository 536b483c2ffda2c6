//! Route definitions for the `/transcriptions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::transcriptions;
use crate::state::AppState;

/// Routes mounted at `/transcriptions`.
///
/// ```text
/// POST   /            -> submit
/// GET    /{id}        -> get_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(transcriptions::submit))
        .route("/{id}", get(transcriptions::get_status))
}
