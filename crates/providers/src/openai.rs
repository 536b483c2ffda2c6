//! OpenAI-compatible transcription and chat-completion providers.
//!
//! Both providers speak the widely cloned OpenAI wire format, so a
//! self-hosted compatible server works by pointing `base_url` at it.

use async_trait::async_trait;
use serde::Deserialize;

use scribe_core::prompt::MINUTES_SYSTEM_PROMPT;
use scribe_engine::adapter::{
    SummarizationError, Summarizer, SummaryRequest, Transcriber, TranscriptionError,
    TranscriptionRequest,
};

/// Speech-to-text over `POST {base_url}/v1/audio/transcriptions`.
pub struct OpenAiTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    default_model: String,
}

/// Response body of the transcription endpoint.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiTranscriber {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url.into()),
            api_key: api_key.into(),
            default_model: default_model.into(),
        }
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<String, TranscriptionError> {
        let audio = tokio::fs::read(&request.audio_path)
            .await
            .map_err(|e| TranscriptionError::Request(format!("Failed to read audio artifact: {e}")))?;
        let filename = request
            .audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());
        tracing::debug!(model = %model, bytes = audio.len(), "Submitting transcription request");

        let mut form = reqwest::multipart::Form::new()
            .text("model", model)
            .text("prompt", request.prompt.clone())
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio).file_name(filename),
            );
        if let Some(language) = request.language.clone() {
            form = form.text("language", language);
        }

        let response = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .timeout(request.deadline)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranscriptionError::DeadlineExceeded
                } else {
                    TranscriptionError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptionError::Provider {
                status: status.as_u16(),
                body: read_error_body(response).await,
            });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Request(format!("Malformed response: {e}")))?;
        Ok(parsed.text)
    }
}

/// Minutes generation over `POST {base_url}/v1/chat/completions`.
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    default_model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiSummarizer {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url.into()),
            api_key: api_key.into(),
            default_model: default_model.into(),
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, request: SummaryRequest) -> Result<String, SummarizationError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        let mut system_prompt = MINUTES_SYSTEM_PROMPT.to_string();
        if let Some(context) = build_context_line(&request) {
            system_prompt.push('\n');
            system_prompt.push_str(&context);
        }

        tracing::debug!(model = %model, chars = request.transcript.len(), "Submitting minutes request");

        let body = serde_json::json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": request.transcript},
            ],
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(request.deadline)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SummarizationError::DeadlineExceeded
                } else {
                    SummarizationError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummarizationError::Provider {
                status: status.as_u16(),
                body: read_error_body(response).await,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizationError::Request(format!("Malformed response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| SummarizationError::Request("Empty completion response".to_string()))
    }
}

/// Fold the submission hints into one extra system line, when present.
fn build_context_line(request: &SummaryRequest) -> Option<String> {
    let summary = request
        .meeting_summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let terms = request
        .key_terms
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (summary, terms) {
        (None, None) => None,
        (Some(s), None) => Some(format!("Context about the meeting: {s}")),
        (None, Some(t)) => Some(format!("Terms and names that may appear: {t}")),
        (Some(s), Some(t)) => Some(format!(
            "Context about the meeting: {s}\nTerms and names that may appear: {t}"
        )),
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

async fn read_error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
