//! Job lifecycle model for the transcription pipeline.
//!
//! A [`JobSnapshot`] is an immutable view of one job at one instant. The
//! executor owning a job is its only writer; every other component reads
//! snapshots through the registry.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::JobFailure;

/// Opaque, globally unique job identifier assigned at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh id. UUIDv4 collision probability is negligible,
    /// so ids are never reused in practice.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ordered phase of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Queued,
    PreparingInput,
    Transcribing,
    Summarizing,
    Completed,
    Failed,
}

impl JobStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Position in the fixed forward order. `Failed` is reachable from any
    /// non-terminal stage and has no position of its own.
    fn order(self) -> Option<u8> {
        match self {
            Self::Queued => Some(0),
            Self::PreparingInput => Some(1),
            Self::Transcribing => Some(2),
            Self::Summarizing => Some(3),
            Self::Completed => Some(4),
            Self::Failed => None,
        }
    }

    /// Whether `self -> next` is a legal transition: the immediate
    /// successor in the forward order, or `Failed` from any non-terminal
    /// stage. Terminal stages permit no transition at all.
    pub fn can_advance_to(self, next: JobStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobStage::Failed {
            return true;
        }
        match (self.order(), next.order()) {
            (Some(current), Some(next)) => next == current + 1,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::PreparingInput => "preparing_input",
            Self::Transcribing => "transcribing",
            Self::Summarizing => "summarizing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a successfully completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinutesResult {
    /// Raw transcript returned by the transcription provider.
    pub transcript: String,
    /// Formatted meeting minutes produced by the summarizer.
    pub minutes: String,
}

/// Immutable copy of a job's state at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub stage: JobStage,
    /// In `0..=100`, non-decreasing while the job is non-terminal.
    pub progress: u8,
    /// Human-readable description of the current activity.
    pub message: String,
    /// Present iff `stage == Completed`.
    pub result: Option<MinutesResult>,
    /// Present iff `stage == Failed`.
    pub error: Option<JobFailure>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobSnapshot {
    /// Initial snapshot written by the submission service.
    pub fn queued(id: JobId) -> Self {
        let now = Utc::now();
        Self {
            id,
            stage: JobStage::Queued,
            progress: 0,
            message: "Queued".to_string(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }
}

/// Input descriptor handed to the executor at submission.
///
/// Owned exclusively by the executor once submitted; the registry and the
/// status read path never touch it.
#[derive(Debug)]
pub struct JobInput {
    /// Temp file holding the uploaded audio. Removed by the executor when
    /// the job reaches a terminal stage.
    pub audio_path: PathBuf,
    /// Free-text summary of what the meeting is about.
    pub meeting_summary: Option<String>,
    /// Terms and names likely to come up in the recording.
    pub key_terms: Option<String>,
    /// Provider model override for the transcription call.
    pub model: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
