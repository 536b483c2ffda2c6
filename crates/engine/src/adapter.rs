//! External stage collaborator interfaces.
//!
//! The executor is polymorphic over these two capabilities and has no
//! knowledge of which concrete provider implements them. Real providers
//! live in `scribe-providers`; tests inject stubs.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

/// One transcription call: the audio artifact plus steering hints.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    /// Temp file holding the uploaded audio.
    pub audio_path: PathBuf,
    /// Spoken-language hint, e.g. `ja`.
    pub language: Option<String>,
    /// Initial prompt assembled from the meeting-summary and key-term hints.
    pub prompt: String,
    /// Provider model override; the provider falls back to its default.
    pub model: Option<String>,
    /// Hard deadline for the call. The executor enforces it as well, so a
    /// provider that ignores it still cannot stall the pipeline.
    pub deadline: Duration,
}

/// One summarization call: the transcript plus the original hints.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub transcript: String,
    /// What the meeting is about, as supplied at submission.
    pub meeting_summary: Option<String>,
    /// Terms and names supplied at submission.
    pub key_terms: Option<String>,
    pub model: Option<String>,
    pub deadline: Duration,
}

/// Errors from a transcription provider.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    /// The call itself failed (network, I/O, malformed response).
    #[error("Transcription request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("Transcription provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    /// The call did not resolve within its deadline.
    #[error("Transcription did not complete within the deadline")]
    DeadlineExceeded,
}

/// Errors from a summarization provider.
#[derive(Debug, thiserror::Error)]
pub enum SummarizationError {
    #[error("Summarization request failed: {0}")]
    Request(String),

    #[error("Summarization provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("Summarization did not complete within the deadline")]
    DeadlineExceeded,
}

/// Speech-to-text capability.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, request: TranscriptionRequest)
        -> Result<String, TranscriptionError>;
}

/// Transcript-to-minutes capability.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: SummaryRequest) -> Result<String, SummarizationError>;
}
