//! Active batch registry
//!
//! Tracks the batches that still have unfinished jobs. The running batch task
//! registers and removes its own entry; cancellation requests arrive from
//! other callers and only flip the entry's flag.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Cancellation flag shared between the registry and a batch task
///
/// Monotonic: once set it is never cleared.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct ActiveBatch {
    job_ids: Vec<Uuid>,
    cancel: CancelFlag,
}

/// Concurrency-safe map of active batches keyed by batch id
#[derive(Default)]
pub struct BatchRegistry {
    batches: Mutex<HashMap<Uuid, ActiveBatch>>,
}

impl BatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a batch and returns its cancellation flag
    pub fn register(&self, batch_id: Uuid, job_ids: Vec<Uuid>) -> CancelFlag {
        let cancel = CancelFlag::default();
        self.lock().insert(
            batch_id,
            ActiveBatch {
                job_ids,
                cancel: cancel.clone(),
            },
        );
        cancel
    }

    /// Requests cancellation of an active batch
    ///
    /// Returns false, changing nothing, when no active batch has that id.
    pub fn cancel(&self, batch_id: Uuid) -> bool {
        match self.lock().get(&batch_id) {
            Some(batch) => {
                batch.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Removes a finished batch
    pub fn remove(&self, batch_id: Uuid) -> bool {
        self.lock().remove(&batch_id).is_some()
    }

    pub fn contains(&self, batch_id: Uuid) -> bool {
        self.lock().contains_key(&batch_id)
    }

    /// Job ids of an active batch, in submission order
    pub fn job_ids(&self, batch_id: Uuid) -> Option<Vec<Uuid>> {
        self.lock().get(&batch_id).map(|batch| batch.job_ids.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ActiveBatch>> {
        self.batches.lock().unwrap_or_else(|e| e.into_inner())
    }
}
