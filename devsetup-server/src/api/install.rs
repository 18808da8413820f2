//! Install API Handlers
//!
//! HTTP endpoints for starting, inspecting and cancelling installations.

use axum::{
    Json,
    extract::{Path, State},
};
use devsetup_core::domain::job::JobDetails;
use devsetup_core::dto::install::{
    ActiveJobs, BatchStarted, CancelResponse, InstallToolSet, InstallTools,
};
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::service::install_service;
use crate::state::AppState;

// =============================================================================
// Batch Endpoints
// =============================================================================

/// POST /api/install/tool
/// Install one or more tools by ID
pub async fn install_tools(
    State(state): State<AppState>,
    Json(req): Json<InstallTools>,
) -> ApiResult<Json<BatchStarted>> {
    tracing::info!("Install requested for tools: {:?}", req.tool_ids);

    let started = install_service::install_tools(&state, &req.tool_ids).await?;
    Ok(Json(started))
}

/// POST /api/install/toolset
/// Install the missing tools of a tool set
pub async fn install_tool_set(
    State(state): State<AppState>,
    Json(req): Json<InstallToolSet>,
) -> ApiResult<Json<BatchStarted>> {
    tracing::info!("Install requested for tool set: {}", req.tool_set);

    let started = install_service::install_tool_set(&state, &req.tool_set).await?;
    Ok(Json(started))
}

/// DELETE /api/install/cancel/{id}
/// Cancel the remaining jobs of an active batch
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CancelResponse>> {
    tracing::info!("Cancel requested for batch: {}", id);

    let response = install_service::cancel(&state, id)?;
    Ok(Json(response))
}

// =============================================================================
// Job Endpoints
// =============================================================================

/// GET /api/install/progress/{id}
/// Get a job with its tool
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JobDetails>> {
    tracing::debug!("Getting progress of job: {}", id);

    let details = install_service::get_progress(&state, id).await?;
    Ok(Json(details))
}

/// GET /api/install/active
/// List jobs still pending or running
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<ActiveJobs>> {
    tracing::debug!("Listing active jobs");

    let active = install_service::list_active(&state).await?;
    Ok(Json(active))
}
