use std::time::Duration;

use scribe_core::input::DEFAULT_MAX_UPLOAD_BYTES;
use scribe_engine::executor::ExecutorConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted audio upload in bytes (default: 25 MiB).
    pub max_upload_bytes: u64,
    /// Cap on simultaneously running pipelines (default: `4`).
    pub max_concurrent_jobs: usize,
    /// Deadline for each external stage call in seconds (default: `120`).
    pub stage_timeout_secs: u64,
    /// Heartbeat tick interval in milliseconds (default: `1000`).
    pub heartbeat_interval_ms: u64,
    /// Spoken-language hint forwarded to the transcriber (default: `ja`).
    pub language_hint: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default     |
    /// |-------------------------|-------------|
    /// | `HOST`                  | `0.0.0.0`   |
    /// | `PORT`                  | `3000`      |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`        |
    /// | `MAX_UPLOAD_BYTES`      | `26214400`  |
    /// | `MAX_CONCURRENT_JOBS`   | `4`         |
    /// | `STAGE_TIMEOUT_SECS`    | `120`       |
    /// | `HEARTBEAT_INTERVAL_MS` | `1000`      |
    /// | `LANGUAGE_HINT`         | `ja`        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: u64 = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid u64");

        let max_concurrent_jobs: usize = std::env::var("MAX_CONCURRENT_JOBS")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("MAX_CONCURRENT_JOBS must be a valid usize");

        let stage_timeout_secs: u64 = std::env::var("STAGE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("STAGE_TIMEOUT_SECS must be a valid u64");

        let heartbeat_interval_ms: u64 = std::env::var("HEARTBEAT_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("HEARTBEAT_INTERVAL_MS must be a valid u64");

        let language_hint = match std::env::var("LANGUAGE_HINT") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(value),
            Err(_) => Some("ja".into()),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            max_concurrent_jobs,
            stage_timeout_secs,
            heartbeat_interval_ms,
            language_hint,
        }
    }

    /// Executor tunables derived from this configuration.
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            stage_timeout: Duration::from_secs(self.stage_timeout_secs),
            heartbeat_interval: Duration::from_millis(self.heartbeat_interval_ms),
            max_concurrent_jobs: self.max_concurrent_jobs,
            language_hint: self.language_hint.clone(),
        }
    }
}
