pub mod health;
pub mod transcriptions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /transcriptions          submit a recording (POST, multipart)
/// /transcriptions/{id}     poll job status (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/transcriptions", transcriptions::router())
}
