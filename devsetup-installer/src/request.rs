//! Install request type

use std::path::PathBuf;

use devsetup_core::domain::tool::Tool;

use crate::error::InstallError;

/// One tool to install as part of a batch
///
/// Immutable once the batch starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub tool_id: i64,
    pub tool_name: String,
    pub display_name: String,
    pub script_path: PathBuf,
}

impl InstallRequest {
    pub fn new(
        tool_id: i64,
        tool_name: impl Into<String>,
        display_name: impl Into<String>,
        script_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tool_id,
            tool_name: tool_name.into(),
            display_name: display_name.into(),
            script_path: script_path.into(),
        }
    }

    /// Builds a request for a catalog tool, resolving its script under `scripts_dir`
    pub fn for_tool(tool: &Tool, scripts_dir: &std::path::Path) -> Self {
        Self::new(
            tool.id,
            tool.name.clone(),
            tool.display_name.clone(),
            scripts_dir.join(&tool.script_path),
        )
    }

    /// Rejects requests that could never produce a meaningful job
    pub fn validate(&self) -> Result<(), InstallError> {
        if self.tool_name.trim().is_empty() {
            return Err(InstallError::InvalidArgument(format!(
                "tool {} has no name",
                self.tool_id
            )));
        }

        if self.script_path.as_os_str().is_empty() {
            return Err(InstallError::InvalidArgument(format!(
                "tool {} has no install script",
                self.tool_name
            )));
        }

        Ok(())
    }
}
