//! Read path over the registry.

use std::sync::Arc;

use scribe_core::job::{JobId, JobSnapshot};

use crate::registry::{JobRegistry, RegistryError};

/// Serves poll requests against the registry.
pub struct StatusQueryService {
    registry: Arc<JobRegistry>,
}

impl StatusQueryService {
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self { registry }
    }

    /// Current snapshot for `id`.
    ///
    /// Delivery policy: the first successful read of a terminal snapshot
    /// evicts the entry, so a finished job's state is delivered at most
    /// once; later polls fail with `NotFound` exactly like an id that
    /// never existed. Polls before the terminal state are idempotent and
    /// side-effect-free.
    pub async fn get_status(&self, id: JobId) -> Result<Arc<JobSnapshot>, RegistryError> {
        let snapshot = self.registry.get(id).await?;

        if snapshot.is_terminal() {
            // A concurrent poll can win the eviction race; the snapshot in
            // hand is still delivered either way.
            if self.registry.delete(id).await.is_ok() {
                tracing::debug!(
                    job_id = %id,
                    stage = %snapshot.stage,
                    "Terminal job evicted after delivery",
                );
            }
        }

        Ok(snapshot)
    }
}
