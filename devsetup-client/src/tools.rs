//! Tool catalog endpoints

use crate::InstallerClient;
use crate::error::Result;
use devsetup_core::domain::tool::{Tool, ToolSet};

impl InstallerClient {
    /// List every catalog tool
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let url = format!("{}/api/tools", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List tools already installed
    pub async fn list_installed_tools(&self) -> Result<Vec<Tool>> {
        let url = format!("{}/api/tools/installed", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get a tool by ID
    pub async fn get_tool(&self, id: i64) -> Result<Tool> {
        let url = format!("{}/api/tools/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List every tool set
    pub async fn list_tool_sets(&self) -> Result<Vec<ToolSet>> {
        let url = format!("{}/api/tools/sets", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
