//! Installation DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::Job;
use crate::domain::tool::Tool;

/// Request to install one or more tools by catalog id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallTools {
    pub tool_ids: Vec<i64>,
}

/// Request to install every missing tool of a tool set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallToolSet {
    pub tool_set: String,
}

/// Response for a successfully started batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStarted {
    /// Batch id (the id of the first job)
    pub batch_id: Uuid,
    /// Job ids in submission order
    pub job_ids: Vec<Uuid>,
    pub tools: Vec<Tool>,
}

/// Response for a cancellation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub batch_id: Uuid,
    /// Jobs of the batch; those not started yet end up `cancelled`
    #[serde(default)]
    pub job_ids: Vec<Uuid>,
    pub message: String,
}

/// Jobs currently pending or running
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveJobs {
    pub jobs: Vec<Job>,
}
