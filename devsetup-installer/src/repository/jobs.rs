//! Jobs repository
//!
//! Durable job records:
//! - Creating a job row for a tool
//! - Applying status transitions with their timestamps, log and error
//! - Point reads and the active job listing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devsetup_core::domain::job::{Job, JobStatus};
use uuid::Uuid;

use super::StoreResult;

/// Repository trait for job records
///
/// Implementations must be safe for concurrent access. A single job row is
/// only ever written by the task running its batch, but different batches
/// write different rows at the same time.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Creates a job row for `tool_id` in the given initial status
    ///
    /// # Returns
    /// The id of the new job
    async fn create_job(&self, tool_id: i64, status: JobStatus) -> StoreResult<Uuid>;

    /// Applies a status transition to a job
    ///
    /// Fails with `InvalidTransition` when the job's current status does not
    /// allow moving to `update.status`, so terminal rows are never rewritten.
    async fn update_job(&self, id: Uuid, update: JobUpdate) -> StoreResult<()>;

    /// Reads a job by id
    async fn get_job(&self, id: Uuid) -> StoreResult<Option<Job>>;

    /// Lists jobs whose status is `pending` or `running`, oldest first
    async fn list_active_jobs(&self) -> StoreResult<Vec<Job>>;
}

/// A status transition together with the fields written alongside it
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    pub status: JobStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub log: Option<String>,
    pub error_message: Option<String>,
}

impl JobUpdate {
    /// `pending -> running`
    pub fn running() -> Self {
        Self {
            status: JobStatus::Running,
            started_at: Some(Utc::now()),
            completed_at: None,
            log: None,
            error_message: None,
        }
    }

    /// `running -> completed` with the captured output
    pub fn completed(log: String) -> Self {
        Self {
            status: JobStatus::Completed,
            started_at: None,
            completed_at: Some(Utc::now()),
            log: Some(log),
            error_message: None,
        }
    }

    /// `running -> failed` with whatever output was captured and the error text
    pub fn failed(log: Option<String>, error_message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            started_at: None,
            completed_at: Some(Utc::now()),
            log,
            error_message: Some(error_message.into()),
        }
    }

    /// `pending -> cancelled`
    pub fn cancelled() -> Self {
        Self {
            status: JobStatus::Cancelled,
            started_at: None,
            completed_at: Some(Utc::now()),
            log: None,
            error_message: None,
        }
    }

    /// `pending -> cancelled` for a job that could not be started
    pub fn not_started(error_message: impl Into<String>) -> Self {
        Self {
            error_message: Some(error_message.into()),
            ..Self::cancelled()
        }
    }

    /// Applies this update to an in-memory job record
    ///
    /// Fields left as `None` keep their current value.
    pub fn apply_to(&self, job: &mut Job) {
        job.status = self.status;
        if let Some(started_at) = self.started_at {
            job.started_at = Some(started_at);
        }
        if let Some(completed_at) = self.completed_at {
            job.completed_at = Some(completed_at);
        }
        if let Some(log) = &self.log {
            job.log = Some(log.clone());
        }
        if let Some(error_message) = &self.error_message {
            job.error_message = Some(error_message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_running_then_failed() {
        let mut job = Job::pending(Uuid::new_v4(), 1);

        JobUpdate::running().apply_to(&mut job);
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());
        assert!(job.completed_at.is_none());

        let started = job.started_at;
        JobUpdate::failed(Some("partial".to_string()), "exit 1").apply_to(&mut job);
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.started_at, started);
        assert!(job.completed_at.is_some());
        assert_eq!(job.log.as_deref(), Some("partial"));
        assert_eq!(job.error_message.as_deref(), Some("exit 1"));
    }

    #[test]
    fn test_cancelled_sets_no_error() {
        let mut job = Job::pending(Uuid::new_v4(), 1);
        JobUpdate::cancelled().apply_to(&mut job);

        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(job.started_at.is_none());
        assert!(job.error_message.is_none());
    }

    #[test]
    fn test_not_started_keeps_error() {
        let mut job = Job::pending(Uuid::new_v4(), 1);
        JobUpdate::not_started("store offline").apply_to(&mut job);

        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(job.completed_at.is_some());
        assert_eq!(job.error_message.as_deref(), Some("store offline"));
    }
}
