//! Minutes formatting without a language model.
//!
//! Used when the deployment explicitly opts out of LLM summarization: the
//! transcript is rendered into the minimal dated bullet layout instead.

use async_trait::async_trait;
use chrono::Utc;

use scribe_core::prompt::render_basic_minutes;
use scribe_engine::adapter::{SummarizationError, Summarizer, SummaryRequest};

/// Local `Summarizer` that formats the raw transcript directly.
#[derive(Debug, Default)]
pub struct BasicFormatter;

#[async_trait]
impl Summarizer for BasicFormatter {
    async fn summarize(&self, request: SummaryRequest) -> Result<String, SummarizationError> {
        Ok(render_basic_minutes(&request.transcript, Utc::now()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
