//! Tool Service
//!
//! Read access to the tool catalog.

use devsetup_core::domain::tool::{Tool, ToolSet};
use sqlx::PgPool;

use crate::repository::tool_repository;

/// Service error type
#[derive(Debug)]
pub enum ToolError {
    NotFound(i64),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for ToolError {
    fn from(err: sqlx::Error) -> Self {
        ToolError::DatabaseError(err)
    }
}

/// List every catalog tool
pub async fn list_tools(pool: &PgPool) -> Result<Vec<Tool>, ToolError> {
    Ok(tool_repository::list_all(pool).await?)
}

/// List tools already installed
pub async fn list_installed(pool: &PgPool) -> Result<Vec<Tool>, ToolError> {
    Ok(tool_repository::list_installed(pool).await?)
}

/// Get a tool by ID
pub async fn get_tool(pool: &PgPool, id: i64) -> Result<Tool, ToolError> {
    tool_repository::find_by_id(pool, id)
        .await?
        .ok_or(ToolError::NotFound(id))
}

/// List every tool set
pub async fn list_tool_sets(pool: &PgPool) -> Result<Vec<ToolSet>, ToolError> {
    Ok(tool_repository::list_tool_sets(pool).await?)
}
