//! Drives one job through the fixed stage sequence.
//!
//! `Queued -> PreparingInput -> Transcribing -> Summarizing -> Completed`,
//! with a universal edge to `Failed`. Each external call runs under a
//! deadline with a heartbeat ticking beside it; the heartbeat is cancelled
//! and joined before the real result is written. Failed stages are never
//! retried here: a caller who wants a retry resubmits.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use scribe_core::error::{FailureKind, JobFailure};
use scribe_core::job::{JobId, JobInput, JobStage, MinutesResult};
use scribe_core::prompt::build_transcription_prompt;

use crate::adapter::{
    SummarizationError, Summarizer, SummaryRequest, Transcriber, TranscriptionError,
    TranscriptionRequest,
};
use crate::progress::{Heartbeat, ProgressReporter};
use crate::registry::JobRegistry;

/// Tunables for the executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Deadline applied to each external stage call.
    pub stage_timeout: Duration,
    /// Interval between synthetic heartbeat ticks.
    pub heartbeat_interval: Duration,
    /// Cap on simultaneously running pipelines, which bounds the number
    /// of outbound calls in flight against the providers.
    pub max_concurrent_jobs: usize,
    /// Spoken-language hint forwarded to the transcriber.
    pub language_hint: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            stage_timeout: Duration::from_secs(120),
            heartbeat_interval: Duration::from_secs(1),
            max_concurrent_jobs: 4,
            language_hint: None,
        }
    }
}

/// Runs jobs to a terminal state. One instance serves the whole process;
/// each job gets its own `run` invocation on its own task.
pub struct PipelineExecutor {
    registry: Arc<JobRegistry>,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<dyn Summarizer>,
    config: ExecutorConfig,
    permits: Semaphore,
}

impl PipelineExecutor {
    pub fn new(
        registry: Arc<JobRegistry>,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
        config: ExecutorConfig,
    ) -> Self {
        let permits = Semaphore::new(config.max_concurrent_jobs);
        Self {
            registry,
            transcriber,
            summarizer,
            config,
            permits,
        }
    }

    /// Run `job_id` to a terminal state.
    ///
    /// Never returns an error to the spawner: every failure, including a
    /// panicking stage, ends up in the job's terminal snapshot, so one bad
    /// job cannot take the worker pool or a sibling job down with it.
    pub async fn run(&self, job_id: JobId, input: JobInput) {
        // Bound the number of simultaneously running pipelines. The job
        // stays visible as Queued while it waits for a permit.
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                // Closed semaphore means the process is going away.
                tracing::warn!(job_id = %job_id, "Executor shutting down, job abandoned");
                return;
            }
        };

        let reporter = ProgressReporter::new(Arc::clone(&self.registry), job_id);

        let outcome = AssertUnwindSafe(self.execute(&reporter, &input))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(JobFailure::internal(panic_message(&panic))));

        match outcome {
            Ok(result) => {
                tracing::info!(job_id = %job_id, "Job completed");
                if let Err(e) = reporter.complete(result).await {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to write terminal result");
                }
            }
            Err(failure) => {
                tracing::warn!(
                    job_id = %job_id,
                    kind = ?failure.kind,
                    error = %failure.message,
                    "Job failed",
                );
                if let Err(e) = reporter.fail(failure).await {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to write terminal error");
                }
            }
        }

        // The input artifact is released on every terminal path.
        release_audio(job_id, &input).await;
    }

    /// The stage sequence proper. Any `Err` becomes the job's terminal
    /// failure; `Ok` carries the completed result.
    async fn execute(
        &self,
        reporter: &ProgressReporter,
        input: &JobInput,
    ) -> Result<MinutesResult, JobFailure> {
        let job_id = reporter.job_id();

        // -- PreparingInput ----
        reporter
            .transition(JobStage::PreparingInput, "Preparing uploaded audio")
            .await
            .map_err(internal)?;

        let audio_bytes = tokio::fs::metadata(&input.audio_path)
            .await
            .map_err(|e| JobFailure::internal(format!("Audio artifact unreadable: {e}")))?
            .len();
        tracing::debug!(job_id = %job_id, bytes = audio_bytes, "Audio artifact ready");

        // -- Transcribing ----
        reporter
            .transition(JobStage::Transcribing, "Transcribing audio")
            .await
            .map_err(internal)?;
        tracing::info!(job_id = %job_id, "Transcription started");

        let request = TranscriptionRequest {
            audio_path: input.audio_path.clone(),
            language: self.config.language_hint.clone(),
            prompt: build_transcription_prompt(
                input.meeting_summary.as_deref(),
                input.key_terms.as_deref(),
            ),
            model: input.model.clone(),
            deadline: self.config.stage_timeout,
        };

        let heartbeat = Heartbeat::start(
            reporter.clone(),
            self.config.heartbeat_interval,
            "Transcribing audio, provider call in flight",
        );
        let call = timeout(
            self.config.stage_timeout,
            self.transcriber.transcribe(request),
        )
        .await;
        // The heartbeat must be gone before the real result is written.
        heartbeat.stop().await;

        let transcript = match call {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(JobFailure::new(FailureKind::Transcription, e.to_string())),
            Err(_) => {
                return Err(JobFailure::new(
                    FailureKind::Transcription,
                    TranscriptionError::DeadlineExceeded.to_string(),
                ))
            }
        };
        tracing::info!(job_id = %job_id, chars = transcript.len(), "Transcription finished");

        // -- Summarizing ----
        reporter
            .transition(JobStage::Summarizing, "Generating minutes")
            .await
            .map_err(internal)?;
        tracing::info!(job_id = %job_id, "Minutes generation started");

        let request = SummaryRequest {
            transcript: transcript.clone(),
            meeting_summary: input.meeting_summary.clone(),
            key_terms: input.key_terms.clone(),
            model: None,
            deadline: self.config.stage_timeout,
        };

        let heartbeat = Heartbeat::start(
            reporter.clone(),
            self.config.heartbeat_interval,
            "Generating minutes, provider call in flight",
        );
        let call = timeout(self.config.stage_timeout, self.summarizer.summarize(request)).await;
        heartbeat.stop().await;

        let minutes = match call {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(JobFailure::new(FailureKind::Summarization, e.to_string())),
            Err(_) => {
                return Err(JobFailure::new(
                    FailureKind::Summarization,
                    SummarizationError::DeadlineExceeded.to_string(),
                ))
            }
        };
        tracing::info!(job_id = %job_id, chars = minutes.len(), "Minutes generation finished");

        Ok(MinutesResult {
            transcript,
            minutes,
        })
    }
}

fn internal(e: impl std::fmt::Display) -> JobFailure {
    JobFailure::internal(e.to_string())
}

/// Best-effort extraction of a panic payload message.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("Stage panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("Stage panicked: {s}")
    } else {
        "Stage panicked".to_string()
    }
}

/// Delete the temp audio artifact. A missing file is fine (a previous
/// attempt may have removed it); anything else is logged and dropped.
async fn release_audio(job_id: JobId, input: &JobInput) {
    match tokio::fs::remove_file(&input.audio_path).await {
        Ok(()) => {
            tracing::debug!(job_id = %job_id, path = %input.audio_path.display(), "Audio artifact removed");
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                job_id = %job_id,
                path = %input.audio_path.display(),
                error = %e,
                "Failed to remove audio artifact",
            );
        }
    }
}
