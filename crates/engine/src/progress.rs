//! Progress reporting and the heartbeat timer.
//!
//! A [`ProgressReporter`] produces the sequence of snapshots written for
//! one job. It is the job's single writer: the executor drives it directly
//! between external calls and hands it to a [`Heartbeat`] task while a
//! call is in flight, never both at once.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use scribe_core::error::JobFailure;
use scribe_core::job::{JobId, JobSnapshot, JobStage, MinutesResult};
use scribe_core::progress::{band_for, next_heartbeat_value, PROGRESS_DONE};

use crate::registry::{JobRegistry, RegistryError};

/// Writes the snapshot sequence for a single job.
#[derive(Clone)]
pub struct ProgressReporter {
    registry: Arc<JobRegistry>,
    job_id: JobId,
}

impl ProgressReporter {
    pub fn new(registry: Arc<JobRegistry>, job_id: JobId) -> Self {
        Self { registry, job_id }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Enter `stage`, pinning progress to the start of its band (or the
    /// current value if the job is somehow already past it).
    pub async fn transition(
        &self,
        stage: JobStage,
        message: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let message = message.into();
        self.update(move |next| {
            if !next.stage.can_advance_to(stage) {
                tracing::error!(
                    from = %next.stage,
                    to = %stage,
                    "Illegal stage transition ignored",
                );
                return false;
            }
            next.stage = stage;
            next.progress = next.progress.max(band_for(stage).start);
            next.message = message;
            true
        })
        .await
    }

    /// Synthetic mid-stage tick, clamped inside the active stage's band.
    /// The band end is reserved for the real result.
    pub async fn tick(&self, message: impl Into<String>) -> Result<(), RegistryError> {
        let message = message.into();
        self.update(move |next| {
            next.progress = next_heartbeat_value(next.stage, next.progress);
            next.message = message;
            true
        })
        .await
    }

    /// Terminal success: progress 100, result attached.
    pub async fn complete(&self, result: MinutesResult) -> Result<(), RegistryError> {
        self.update(move |next| {
            next.stage = JobStage::Completed;
            next.progress = PROGRESS_DONE;
            next.message = "Minutes ready".to_string();
            next.result = Some(result);
            true
        })
        .await
    }

    /// Terminal failure: stage `Failed`, error descriptor attached,
    /// progress frozen at whatever the pipeline had reached.
    pub async fn fail(&self, failure: JobFailure) -> Result<(), RegistryError> {
        self.update(move |next| {
            next.stage = JobStage::Failed;
            next.message = failure.message.clone();
            next.error = Some(failure);
            true
        })
        .await
    }

    /// Clone-modify-swap against the registry. Refuses to touch terminal
    /// snapshots and never lets progress decrease, so every write upholds
    /// the snapshot invariants no matter which caller made it.
    async fn update(
        &self,
        apply: impl FnOnce(&mut JobSnapshot) -> bool,
    ) -> Result<(), RegistryError> {
        let current = self.registry.get(self.job_id).await?;
        if current.is_terminal() {
            tracing::warn!(job_id = %self.job_id, "Ignoring write to terminal job");
            return Ok(());
        }

        let mut next = (*current).clone();
        if !apply(&mut next) {
            return Ok(());
        }
        next.progress = next.progress.max(current.progress);
        next.updated_at = Utc::now();
        self.registry.put(next).await
    }
}

/// Cancellable timer emitting synthetic progress ticks while an external
/// call is in flight.
///
/// [`Heartbeat::stop`] cancels the token and then awaits the task, so no
/// tick can be written after the real result is known.
pub struct Heartbeat {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl Heartbeat {
    /// Spawn the tick task. The first tick fires one full interval after
    /// the stage transition, keeping the transition message visible.
    pub fn start(reporter: ProgressReporter, interval: Duration, message: impl Into<String>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let message = message.into();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // interval's first tick resolves immediately; consume it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = reporter.tick(message.clone()).await {
                            tracing::warn!(
                                job_id = %reporter.job_id(),
                                error = %e,
                                "Heartbeat tick failed, stopping",
                            );
                            break;
                        }
                    }
                }
            }
        });

        Self { cancel, handle }
    }

    /// Cancel the timer and wait for the task to finish. Must resolve
    /// before the owning call's real result is written.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Heartbeat task ended abnormally");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::error::{FailureKind, JobFailure};

    async fn reporter_with_job() -> (Arc<JobRegistry>, ProgressReporter) {
        let registry = Arc::new(JobRegistry::new());
        let id = JobId::new();
        registry.create(JobSnapshot::queued(id)).await.unwrap();
        (Arc::clone(&registry), ProgressReporter::new(registry, id))
    }

    #[tokio::test]
    async fn transition_pins_progress_to_the_band_start() {
        let (registry, reporter) = reporter_with_job().await;

        reporter
            .transition(JobStage::PreparingInput, "Preparing")
            .await
            .unwrap();
        reporter
            .transition(JobStage::Transcribing, "Transcribing")
            .await
            .unwrap();

        let snapshot = registry.get(reporter.job_id()).await.unwrap();
        assert_eq!(snapshot.stage, JobStage::Transcribing);
        assert_eq!(snapshot.progress, band_for(JobStage::Transcribing).start);
        assert_eq!(snapshot.message, "Transcribing");
    }

    #[tokio::test]
    async fn skipped_transition_is_ignored() {
        let (registry, reporter) = reporter_with_job().await;

        // Queued -> Summarizing skips two stages and must not be applied.
        reporter
            .transition(JobStage::Summarizing, "Summarizing")
            .await
            .unwrap();

        let snapshot = registry.get(reporter.job_id()).await.unwrap();
        assert_eq!(snapshot.stage, JobStage::Queued);
    }

    #[tokio::test]
    async fn ticks_advance_but_stay_below_the_band_end() {
        let (registry, reporter) = reporter_with_job().await;
        reporter
            .transition(JobStage::PreparingInput, "Preparing")
            .await
            .unwrap();
        reporter
            .transition(JobStage::Transcribing, "Transcribing")
            .await
            .unwrap();

        for _ in 0..100 {
            reporter.tick("Still transcribing").await.unwrap();
        }

        let snapshot = registry.get(reporter.job_id()).await.unwrap();
        let band = band_for(JobStage::Transcribing);
        assert_eq!(snapshot.progress, band.heartbeat_ceiling());
        assert!(snapshot.progress < band.end);
    }

    #[tokio::test]
    async fn complete_writes_the_terminal_result() {
        let (registry, reporter) = reporter_with_job().await;

        reporter
            .transition(JobStage::PreparingInput, "Preparing")
            .await
            .unwrap();
        reporter
            .transition(JobStage::Transcribing, "Transcribing")
            .await
            .unwrap();
        reporter
            .transition(JobStage::Summarizing, "Summarizing")
            .await
            .unwrap();
        reporter
            .complete(MinutesResult {
                transcript: "X".into(),
                minutes: "Y".into(),
            })
            .await
            .unwrap();

        let snapshot = registry.get(reporter.job_id()).await.unwrap();
        assert_eq!(snapshot.stage, JobStage::Completed);
        assert_eq!(snapshot.progress, PROGRESS_DONE);
        assert!(snapshot.result.is_some());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn terminal_snapshots_are_immutable() {
        let (registry, reporter) = reporter_with_job().await;
        reporter
            .fail(JobFailure::new(FailureKind::Internal, "boom"))
            .await
            .unwrap();

        // Any further write is dropped.
        reporter.tick("late tick").await.unwrap();
        reporter
            .fail(JobFailure::new(FailureKind::Internal, "second"))
            .await
            .unwrap();

        let snapshot = registry.get(reporter.job_id()).await.unwrap();
        assert_eq!(snapshot.stage, JobStage::Failed);
        assert_eq!(snapshot.error.as_ref().unwrap().message, "boom");
        assert!(snapshot.result.is_none());
    }

    #[tokio::test]
    async fn heartbeat_stops_cleanly_and_writes_nothing_afterwards() {
        let (registry, reporter) = reporter_with_job().await;
        reporter
            .transition(JobStage::PreparingInput, "Preparing")
            .await
            .unwrap();
        reporter
            .transition(JobStage::Transcribing, "Transcribing")
            .await
            .unwrap();

        let heartbeat = Heartbeat::start(
            reporter.clone(),
            Duration::from_millis(5),
            "Still transcribing",
        );
        tokio::time::sleep(Duration::from_millis(30)).await;
        heartbeat.stop().await;

        let after_stop = registry.get(reporter.job_id()).await.unwrap();
        assert!(after_stop.progress > band_for(JobStage::Transcribing).start);

        // No tick may land once stop() has returned.
        tokio::time::sleep(Duration::from_millis(30)).await;
        let later = registry.get(reporter.job_id()).await.unwrap();
        assert_eq!(later.progress, after_stop.progress);
        assert_eq!(later.updated_at, after_stop.updated_at);
    }
}
