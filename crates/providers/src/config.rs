//! Provider configuration loaded from environment variables.

use std::sync::Arc;

use scribe_engine::adapter::{Summarizer, Transcriber};

use crate::fallback::BasicFormatter;
use crate::openai::{OpenAiSummarizer, OpenAiTranscriber};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TRANSCRIBE_MODEL: &str = "whisper-1";
const DEFAULT_MINUTES_MODEL: &str = "gpt-4-turbo-preview";

/// Which summarizer implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarizerKind {
    /// Chat-completion minutes via the configured API.
    OpenAi,
    /// Local formatting without a language model.
    Basic,
}

/// Provider settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Bearer token for the OpenAI-compatible API.
    pub api_key: String,
    /// Base URL of the API, without a trailing path.
    pub base_url: String,
    /// Default transcription model; overridable per request.
    pub transcribe_model: String,
    /// Model used for minutes generation.
    pub minutes_model: String,
    pub summarizer: SummarizerKind,
}

impl ProviderConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                    |
    /// |--------------------|----------------------------|
    /// | `OPENAI_API_KEY`   | (required)                 |
    /// | `OPENAI_BASE_URL`  | `https://api.openai.com`   |
    /// | `TRANSCRIBE_MODEL` | `whisper-1`                |
    /// | `MINUTES_MODEL`    | `gpt-4-turbo-preview`      |
    /// | `SUMMARIZER`       | `openai`                   |
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let transcribe_model =
            std::env::var("TRANSCRIBE_MODEL").unwrap_or_else(|_| DEFAULT_TRANSCRIBE_MODEL.into());
        let minutes_model =
            std::env::var("MINUTES_MODEL").unwrap_or_else(|_| DEFAULT_MINUTES_MODEL.into());

        let summarizer = match std::env::var("SUMMARIZER")
            .unwrap_or_else(|_| "openai".into())
            .to_lowercase()
            .as_str()
        {
            "openai" => SummarizerKind::OpenAi,
            "basic" => SummarizerKind::Basic,
            other => panic!("SUMMARIZER must be 'openai' or 'basic', got '{other}'"),
        };

        Self {
            api_key,
            base_url,
            transcribe_model,
            minutes_model,
            summarizer,
        }
    }

    /// Construct the adapter pair, sharing one HTTP client for
    /// connection pooling.
    pub fn build(&self) -> (Arc<dyn Transcriber>, Arc<dyn Summarizer>) {
        let client = reqwest::Client::new();

        let transcriber: Arc<dyn Transcriber> = Arc::new(OpenAiTranscriber::new(
            client.clone(),
            self.base_url.clone(),
            self.api_key.clone(),
            self.transcribe_model.clone(),
        ));

        let summarizer: Arc<dyn Summarizer> = match self.summarizer {
            SummarizerKind::OpenAi => Arc::new(OpenAiSummarizer::new(
                client,
                self.base_url.clone(),
                self.api_key.clone(),
                self.minutes_model.clone(),
            )),
            SummarizerKind::Basic => Arc::new(BasicFormatter),
        };

        (transcriber, summarizer)
    }
}
