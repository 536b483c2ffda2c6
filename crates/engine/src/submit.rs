//! Non-blocking job submission.

use std::sync::Arc;

use scribe_core::job::{JobId, JobInput, JobSnapshot};

use crate::executor::PipelineExecutor;
use crate::registry::{JobRegistry, RegistryError};

/// Creates jobs and dispatches the executor for each one.
pub struct JobSubmissionService {
    registry: Arc<JobRegistry>,
    executor: Arc<PipelineExecutor>,
}

impl JobSubmissionService {
    pub fn new(registry: Arc<JobRegistry>, executor: Arc<PipelineExecutor>) -> Self {
        Self { registry, executor }
    }

    /// Create a `Queued` job for an already-validated input and dispatch
    /// the pipeline on its own task. Returns the fresh id immediately and
    /// never waits on any stage.
    pub async fn submit(&self, input: JobInput) -> Result<JobId, RegistryError> {
        let id = JobId::new();
        self.registry.create(JobSnapshot::queued(id)).await?;

        let executor = Arc::clone(&self.executor);
        tokio::spawn(async move {
            executor.run(id, input).await;
        });

        tracing::info!(job_id = %id, "Job submitted");
        Ok(id)
    }
}
