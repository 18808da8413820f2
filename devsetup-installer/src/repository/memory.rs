//! In-memory repository
//!
//! Implements both [`JobStore`] and [`ToolCatalog`] on top of a mutex-guarded
//! map. Every status written to a job is also recorded so callers can inspect
//! the full transition history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devsetup_core::domain::job::{Job, JobStatus};
use devsetup_core::domain::tool::Tool;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{JobStore, JobUpdate, StoreResult, ToolCatalog};
use crate::error::StoreError;

#[derive(Default)]
struct State {
    jobs: HashMap<Uuid, Job>,
    /// Job ids in creation order
    order: Vec<Uuid>,
    history: HashMap<Uuid, Vec<JobStatus>>,
    tools: HashMap<i64, Tool>,
}

/// In-memory job store and tool catalog
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with catalog tools
    pub fn with_tools(tools: impl IntoIterator<Item = Tool>) -> Self {
        let store = Self::new();
        for tool in tools {
            store.insert_tool(tool);
        }
        store
    }

    /// Adds or replaces a catalog tool
    pub fn insert_tool(&self, tool: Tool) {
        self.lock().tools.insert(tool.id, tool);
    }

    /// Every status written to the job, in order, starting with its initial one
    pub fn transitions(&self, id: Uuid) -> Vec<JobStatus> {
        self.lock().history.get(&id).cloned().unwrap_or_default()
    }

    /// All jobs in creation order
    pub fn jobs(&self) -> Vec<Job> {
        let state = self.lock();
        state
            .order
            .iter()
            .filter_map(|id| state.jobs.get(id).cloned())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create_job(&self, tool_id: i64, status: JobStatus) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        let mut job = Job::pending(id, tool_id);
        job.status = status;

        let mut state = self.lock();
        state.jobs.insert(id, job);
        state.order.push(id);
        state.history.insert(id, vec![status]);

        Ok(id)
    }

    async fn update_job(&self, id: Uuid, update: JobUpdate) -> StoreResult<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let job = state.jobs.get_mut(&id).ok_or(StoreError::JobNotFound(id))?;

        if !job.status.can_transition_to(update.status) {
            return Err(StoreError::InvalidTransition {
                id,
                from: job.status,
                to: update.status,
            });
        }

        update.apply_to(job);
        state.history.entry(id).or_default().push(update.status);

        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        Ok(self.lock().jobs.get(&id).cloned())
    }

    async fn list_active_jobs(&self) -> StoreResult<Vec<Job>> {
        let state = self.lock();
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.jobs.get(id))
            .filter(|job| job.status.is_active())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ToolCatalog for MemoryStore {
    async fn get_tool(&self, id: i64) -> StoreResult<Option<Tool>> {
        Ok(self.lock().tools.get(&id).cloned())
    }

    async fn mark_installed(&self, id: i64, at: DateTime<Utc>) -> StoreResult<()> {
        let mut state = self.lock();
        let tool = state.tools.get_mut(&id).ok_or(StoreError::ToolNotFound(id))?;
        tool.installed = true;
        tool.install_date = Some(at);
        Ok(())
    }
}
