//! Progress event types
//!
//! Events emitted by the installer on every job transition and every captured
//! output line. Transports (WebSocket, polling) consume them unchanged.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status carried by a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
    /// The whole batch finished
    Complete,
}

/// A single progress notification for a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub batch_id: Uuid,
    pub tool_name: Option<String>,
    pub status: ProgressStatus,
    /// Finished jobs over total jobs, 0..=100
    pub percent: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ProgressEvent {
    pub fn new(
        batch_id: Uuid,
        tool_name: Option<String>,
        status: ProgressStatus,
        percent: u8,
        message: impl Into<String>,
    ) -> Self {
        Self {
            batch_id,
            tool_name,
            status,
            percent,
            message: message.into(),
            log_line: None,
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_log_line(mut self, line: impl Into<String>) -> Self {
        self.log_line = Some(line.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Whether this is the final event of its batch
    pub fn is_batch_end(&self) -> bool {
        self.status == ProgressStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_skipped() {
        let event = ProgressEvent::new(Uuid::new_v4(), None, ProgressStatus::Complete, 100, "done");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["status"], "complete");
        assert!(value.get("log_line").is_none());
        assert!(value.get("error").is_none());
        assert!(event.is_batch_end());
    }

    #[test]
    fn test_builder_sets_fields() {
        let event = ProgressEvent::new(
            Uuid::new_v4(),
            Some("git".to_string()),
            ProgressStatus::Failed,
            33,
            "Failed to install Git",
        )
        .with_error("script exited with code 1: boom");

        assert_eq!(event.error.as_deref(), Some("script exited with code 1: boom"));
        assert!(event.log_line.is_none());
        assert!(!event.is_batch_end());
    }
}
