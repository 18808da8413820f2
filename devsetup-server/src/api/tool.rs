//! Tool API Handlers
//!
//! HTTP endpoints for browsing the tool catalog.

use axum::{
    Json,
    extract::{Path, State},
};
use devsetup_core::domain::tool::{Tool, ToolSet};

use crate::api::error::ApiResult;
use crate::service::tool_service;
use crate::state::AppState;

/// GET /api/tools
/// List all tools
pub async fn list_tools(State(state): State<AppState>) -> ApiResult<Json<Vec<Tool>>> {
    tracing::debug!("Listing tools");

    let tools = tool_service::list_tools(&state.pool).await?;
    Ok(Json(tools))
}

/// GET /api/tools/installed
/// List installed tools
pub async fn list_installed(State(state): State<AppState>) -> ApiResult<Json<Vec<Tool>>> {
    tracing::debug!("Listing installed tools");

    let tools = tool_service::list_installed(&state.pool).await?;
    Ok(Json(tools))
}

/// GET /api/tools/sets
/// List all tool sets
pub async fn list_tool_sets(State(state): State<AppState>) -> ApiResult<Json<Vec<ToolSet>>> {
    tracing::debug!("Listing tool sets");

    let sets = tool_service::list_tool_sets(&state.pool).await?;
    Ok(Json(sets))
}

/// GET /api/tools/{id}
/// Get tool details by ID
pub async fn get_tool(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Tool>> {
    tracing::debug!("Getting tool: {}", id);

    let tool = tool_service::get_tool(&state.pool, id).await?;
    Ok(Json(tool))
}
