//! Liveness endpoint.

use axum::Json;
use serde_json::{json, Value};

/// GET /health
///
/// Returns 200 with the service status and version. Job state is
/// in-memory, so there is no backing store to probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
