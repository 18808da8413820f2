//! Tool catalog repository
//!
//! The slice of the tool catalog the installer needs: reading tool metadata
//! and flagging a tool as installed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devsetup_core::domain::tool::Tool;

use super::StoreResult;

/// Repository trait for tool catalog operations
#[async_trait]
pub trait ToolCatalog: Send + Sync {
    /// Reads a tool by id
    async fn get_tool(&self, id: i64) -> StoreResult<Option<Tool>>;

    /// Marks a tool as installed at the given time
    async fn mark_installed(&self, id: i64, at: DateTime<Utc>) -> StoreResult<()>;
}
