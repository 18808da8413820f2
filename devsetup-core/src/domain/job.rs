//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::tool::Tool;

/// One installation attempt of one tool within a batch
///
/// Structure shared between the installer (drives it) and the store (persists it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub tool_id: i64,
    pub status: JobStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub log: Option<String>,
    pub error_message: Option<String>,
}

impl Job {
    /// Creates a fresh job record in the `Pending` state
    pub fn pending(id: Uuid, tool_id: i64) -> Self {
        Self {
            id,
            tool_id,
            status: JobStatus::Pending,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            log: None,
            error_message: None,
        }
    }
}

/// Job lifecycle status
///
/// `Pending -> Running -> {Completed | Failed}` or `Pending -> Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether no further transition is possible from this status
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Whether the job is still waiting or executing
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Cancelled)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}

/// A job joined with the metadata of the tool it installs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(flatten)]
    pub job: Job,
    pub tool: Option<Tool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_valid_transitions() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Cancelled));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Failed));
    }

    #[test]
    fn test_invalid_transitions() {
        // running jobs are never preempted by cancellation
        assert!(!JobStatus::Running.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Running.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));

        for terminal in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
            for next in [
                JobStatus::Pending,
                JobStatus::Running,
                JobStatus::Completed,
                JobStatus::Failed,
                JobStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        assert_eq!("running".parse::<JobStatus>(), Ok(JobStatus::Running));
        assert!("Queued".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_details_flattens_job() {
        let details = JobDetails {
            job: Job::pending(Uuid::new_v4(), 7),
            tool: None,
        };

        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["tool_id"], 7);
        assert_eq!(value["status"], "pending");
        assert!(value["tool"].is_null());
    }
}
