//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use scribe_api::config::ServerConfig;
use scribe_api::state::AppState;
use scribe_engine::adapter::{
    SummarizationError, Summarizer, SummaryRequest, Transcriber, TranscriptionError,
    TranscriptionRequest,
};
use scribe_engine::executor::PipelineExecutor;
use scribe_engine::registry::JobRegistry;
use scribe_engine::status::StatusQueryService;
use scribe_engine::submit::JobSubmissionService;

// ---------------------------------------------------------------------------
// Stub adapters
// ---------------------------------------------------------------------------

/// Transcriber that answers immediately with a fixed transcript.
pub struct InstantTranscriber;

#[async_trait]
impl Transcriber for InstantTranscriber {
    async fn transcribe(&self, _request: TranscriptionRequest) -> Result<String, TranscriptionError> {
        Ok("stub transcript".to_string())
    }
}

/// Transcriber that always fails.
pub struct FailingTranscriber;

#[async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(&self, _request: TranscriptionRequest) -> Result<String, TranscriptionError> {
        Err(TranscriptionError::Request("boom".to_string()))
    }
}

/// Summarizer that answers immediately with fixed minutes.
pub struct InstantSummarizer;

#[async_trait]
impl Summarizer for InstantSummarizer {
    async fn summarize(&self, _request: SummaryRequest) -> Result<String, SummarizationError> {
        Ok("stub minutes".to_string())
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and fast timers.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        max_concurrent_jobs: 4,
        stage_timeout_secs: 2,
        heartbeat_interval_ms: 20,
        language_hint: None,
    }
}

/// Build the full application router with all middleware layers, wired to
/// the given stub adapters.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app_with(
    transcriber: impl Transcriber + 'static,
    summarizer: impl Summarizer + 'static,
) -> Router {
    let config = test_config();

    let registry = Arc::new(JobRegistry::new());
    let executor = Arc::new(PipelineExecutor::new(
        Arc::clone(&registry),
        Arc::new(transcriber),
        Arc::new(summarizer),
        config.executor_config(),
    ));
    let submission = Arc::new(JobSubmissionService::new(Arc::clone(&registry), executor));
    let status = Arc::new(StatusQueryService::new(registry));

    let state = AppState {
        config: Arc::new(config),
        submission,
        status,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    scribe_api::build_app(state)
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
}

/// Test app with well-behaved instant stubs.
pub fn build_test_app() -> Router {
    build_test_app_with(InstantTranscriber, InstantSummarizer)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a GET request against the app.
pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Multipart boundary used by [`multipart_upload`].
pub const BOUNDARY: &str = "scribe-test-boundary";

/// Assemble a `multipart/form-data` body with a `file` part plus optional
/// extra text fields.
pub fn multipart_upload(filename: &str, file_bytes: &[u8], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(file_bytes);
    body.extend_from_slice(b"\r\n");

    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST a multipart body to the app.
pub async fn post_multipart(app: &Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 2 * 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
