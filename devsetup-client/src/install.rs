//! Installation endpoints

use crate::InstallerClient;
use crate::error::Result;
use devsetup_core::domain::job::JobDetails;
use devsetup_core::dto::install::{
    ActiveJobs, BatchStarted, CancelResponse, InstallToolSet, InstallTools,
};
use uuid::Uuid;

impl InstallerClient {
    // =============================================================================
    // Batches
    // =============================================================================

    /// Start installing tools by ID
    ///
    /// # Arguments
    /// * `tool_ids` - Catalog ids, installed in this order
    ///
    /// # Returns
    /// The batch id, the job ids and the resolved tools
    ///
    /// # Example
    /// ```no_run
    /// # use devsetup_client::InstallerClient;
    /// # async fn example() -> devsetup_client::Result<()> {
    /// let client = InstallerClient::new("http://localhost:7842");
    /// let started = client.install_tools(vec![1, 2]).await?;
    /// println!("batch {}", started.batch_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn install_tools(&self, tool_ids: Vec<i64>) -> Result<BatchStarted> {
        let url = format!("{}/api/install/tool", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&InstallTools { tool_ids })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Start installing the missing tools of a tool set
    pub async fn install_tool_set(&self, name: impl Into<String>) -> Result<BatchStarted> {
        let url = format!("{}/api/install/toolset", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&InstallToolSet {
                tool_set: name.into(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Cancel the remaining jobs of an active batch
    pub async fn cancel_batch(&self, batch_id: Uuid) -> Result<CancelResponse> {
        let url = format!("{}/api/install/cancel/{}", self.base_url, batch_id);
        let response = self.client.delete(&url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Jobs
    // =============================================================================

    /// Get a job with its tool
    pub async fn get_job(&self, job_id: Uuid) -> Result<JobDetails> {
        let url = format!("{}/api/install/progress/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List jobs still pending or running
    pub async fn list_active(&self) -> Result<ActiveJobs> {
        let url = format!("{}/api/install/active", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
