//! Concurrency-safe store of job id -> current snapshot.
//!
//! State is in-memory and process-local: a restart loses every in-flight
//! job. That is a documented property of the service, not something this
//! type works around.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use scribe_core::job::{JobId, JobSnapshot};

/// Per-job slot: an atomically swapped reference to an immutable snapshot.
/// Readers clone the inner `Arc` and can never observe a partial write.
type Slot = Arc<RwLock<Arc<JobSnapshot>>>;

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// An entry with this id already exists. Ids are UUIDv4, so this
    /// indicates a caller bug rather than a collision.
    #[error("Job {0} already exists")]
    DuplicateId(JobId),

    /// No entry for this id: never submitted, or already evicted.
    #[error("Job {0} not found")]
    NotFound(JobId),
}

/// In-memory job store, one entry per job id.
///
/// Entries are created by the submission service, rewritten only by the
/// executor owning the job, read by any number of concurrent pollers, and
/// evicted by the status read path once a terminal snapshot has been
/// delivered.
#[derive(Default)]
pub struct JobRegistry {
    entries: RwLock<HashMap<JobId, Slot>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the initial snapshot for a new job.
    pub async fn create(&self, snapshot: JobSnapshot) -> Result<(), RegistryError> {
        let id = snapshot.id;
        let mut entries = self.entries.write().await;
        if entries.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        entries.insert(id, Arc::new(RwLock::new(Arc::new(snapshot))));
        Ok(())
    }

    /// Atomically replace the stored snapshot.
    ///
    /// Exactly one writer (the executor owning the job) exists per entry,
    /// so this only has to guarantee that concurrent readers see either
    /// the old or the new snapshot, never a mix. The map itself is only
    /// read-locked here: writers for different jobs do not contend.
    pub async fn put(&self, snapshot: JobSnapshot) -> Result<(), RegistryError> {
        let slot = {
            let entries = self.entries.read().await;
            entries
                .get(&snapshot.id)
                .cloned()
                .ok_or(RegistryError::NotFound(snapshot.id))?
        };
        *slot.write().await = Arc::new(snapshot);
        Ok(())
    }

    /// Fetch the current snapshot.
    pub async fn get(&self, id: JobId) -> Result<Arc<JobSnapshot>, RegistryError> {
        let slot = {
            let entries = self.entries.read().await;
            entries.get(&id).cloned().ok_or(RegistryError::NotFound(id))?
        };
        let snapshot = slot.read().await.clone();
        Ok(snapshot)
    }

    /// Remove the entry.
    pub async fn delete(&self, id: JobId) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().await;
        entries
            .remove(&id)
            .map(|_| ())
            .ok_or(RegistryError::NotFound(id))
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
