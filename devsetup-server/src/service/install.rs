//! Install Service
//!
//! Resolves catalog tools into install requests and hands them to the
//! installer. Validation happens here, before any job is created.

use devsetup_core::domain::job::JobDetails;
use devsetup_core::domain::tool::Tool;
use devsetup_core::dto::install::{ActiveJobs, BatchStarted, CancelResponse};
use devsetup_installer::{InstallError, InstallRequest};
use uuid::Uuid;

use crate::repository::tool_repository;
use crate::state::AppState;

/// Service error type
#[derive(Debug)]
pub enum InstallServiceError {
    NoToolsRequested,
    ToolNotFound(i64),
    AlreadyInstalled(String),
    ToolSetNotFound(String),
    NothingToInstall(String),
    BatchNotActive(Uuid),
    Installer(InstallError),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for InstallServiceError {
    fn from(err: sqlx::Error) -> Self {
        InstallServiceError::DatabaseError(err)
    }
}

impl From<InstallError> for InstallServiceError {
    fn from(err: InstallError) -> Self {
        InstallServiceError::Installer(err)
    }
}

/// Install tools by catalog id
///
/// Every id must exist and must not be installed yet; otherwise nothing is
/// started.
pub async fn install_tools(
    state: &AppState,
    tool_ids: &[i64],
) -> Result<BatchStarted, InstallServiceError> {
    if tool_ids.is_empty() {
        return Err(InstallServiceError::NoToolsRequested);
    }

    let mut tools = Vec::with_capacity(tool_ids.len());
    for id in tool_ids {
        let tool = tool_repository::find_by_id(&state.pool, *id)
            .await?
            .ok_or(InstallServiceError::ToolNotFound(*id))?;
        if tool.installed {
            return Err(InstallServiceError::AlreadyInstalled(tool.display_name));
        }
        tools.push(tool);
    }

    start(state, tools).await
}

/// Install every tool of a set that is not installed yet
pub async fn install_tool_set(
    state: &AppState,
    name: &str,
) -> Result<BatchStarted, InstallServiceError> {
    let set = tool_repository::find_tool_set(&state.pool, name)
        .await?
        .ok_or_else(|| InstallServiceError::ToolSetNotFound(name.to_string()))?;

    let mut tools = Vec::new();
    for tool_name in &set.tools {
        match tool_repository::find_by_name(&state.pool, tool_name).await? {
            Some(tool) if !tool.installed => tools.push(tool),
            Some(_) => {}
            None => tracing::warn!("Tool set {} lists unknown tool {}", set.name, tool_name),
        }
    }

    if tools.is_empty() {
        return Err(InstallServiceError::NothingToInstall(set.display_name));
    }

    tracing::info!(
        "Installing tool set {} ({} tool(s))",
        set.name,
        tools.len()
    );
    start(state, tools).await
}

/// Get a job joined with its tool
pub async fn get_progress(state: &AppState, job_id: Uuid) -> Result<JobDetails, InstallServiceError> {
    Ok(state.installer.get_job_status(job_id).await?)
}

/// Request cancellation of an active batch
pub fn cancel(state: &AppState, batch_id: Uuid) -> Result<CancelResponse, InstallServiceError> {
    let job_ids = state.installer.batch_jobs(batch_id).unwrap_or_default();
    if !state.installer.cancel_batch(batch_id) {
        return Err(InstallServiceError::BatchNotActive(batch_id));
    }

    Ok(CancelResponse {
        batch_id,
        job_ids,
        message: "Installation cancelled".to_string(),
    })
}

/// List jobs still pending or running
pub async fn list_active(state: &AppState) -> Result<ActiveJobs, InstallServiceError> {
    let jobs = state.installer.list_active_jobs().await?;
    Ok(ActiveJobs { jobs })
}

async fn start(state: &AppState, tools: Vec<Tool>) -> Result<BatchStarted, InstallServiceError> {
    let requests = tools
        .iter()
        .map(|tool| InstallRequest::for_tool(tool, &state.scripts_dir))
        .collect();

    // progress reaches clients through the broadcast hub
    let handle = state.installer.start_batch(requests).await?;

    tracing::info!(
        "Started batch {} with {} tool(s)",
        handle.id,
        tools.len()
    );

    Ok(BatchStarted {
        batch_id: handle.id,
        job_ids: handle.job_ids,
        tools,
    })
}
