//! Tool Repository
//!
//! Handles all database operations related to tools and tool sets.

use chrono::{DateTime, Utc};
use devsetup_core::domain::tool::{Tool, ToolSet};
use sqlx::PgPool;

use crate::catalog::{ToolSeed, ToolSetSeed};

/// List all tools, grouped by category
pub async fn list_all(pool: &PgPool) -> Result<Vec<Tool>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ToolRow>(
        r#"
        SELECT id, name, display_name, category, description, script_path,
               icon, installed, install_date
        FROM tools
        ORDER BY category, display_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// List tools flagged as installed
pub async fn list_installed(pool: &PgPool) -> Result<Vec<Tool>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ToolRow>(
        r#"
        SELECT id, name, display_name, category, description, script_path,
               icon, installed, install_date
        FROM tools
        WHERE installed
        ORDER BY category, display_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Find a tool by ID
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Tool>, sqlx::Error> {
    let row = sqlx::query_as::<_, ToolRow>(
        r#"
        SELECT id, name, display_name, category, description, script_path,
               icon, installed, install_date
        FROM tools
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Find a tool by its unique name
pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Tool>, sqlx::Error> {
    let row = sqlx::query_as::<_, ToolRow>(
        r#"
        SELECT id, name, display_name, category, description, script_path,
               icon, installed, install_date
        FROM tools
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Flag a tool as installed; returns false if the tool does not exist
pub async fn mark_installed(pool: &PgPool, id: i64, at: DateTime<Utc>) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE tools
        SET installed = TRUE, install_date = $1
        WHERE id = $2
        "#,
    )
    .bind(at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert a catalog tool or refresh its metadata, keeping its installed flag
pub async fn upsert_tool(pool: &PgPool, seed: &ToolSeed) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO tools (name, display_name, category, description, script_path, icon)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (name) DO UPDATE
        SET display_name = EXCLUDED.display_name,
            category = EXCLUDED.category,
            description = EXCLUDED.description,
            script_path = EXCLUDED.script_path,
            icon = EXCLUDED.icon
        "#,
    )
    .bind(seed.name)
    .bind(seed.display_name)
    .bind(seed.category)
    .bind(seed.description)
    .bind(seed.script_path)
    .bind(seed.icon)
    .execute(pool)
    .await?;

    Ok(())
}

/// List all tool sets
pub async fn list_tool_sets(pool: &PgPool) -> Result<Vec<ToolSet>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ToolSetRow>(
        r#"
        SELECT id, name, display_name, description, tools
        FROM tool_sets
        ORDER BY display_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Find a tool set by its unique name
pub async fn find_tool_set(pool: &PgPool, name: &str) -> Result<Option<ToolSet>, sqlx::Error> {
    let row = sqlx::query_as::<_, ToolSetRow>(
        r#"
        SELECT id, name, display_name, description, tools
        FROM tool_sets
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Insert a catalog tool set or refresh it
pub async fn upsert_tool_set(pool: &PgPool, seed: &ToolSetSeed) -> Result<(), sqlx::Error> {
    let tools: Vec<String> = seed.tools.iter().map(|t| t.to_string()).collect();

    sqlx::query(
        r#"
        INSERT INTO tool_sets (name, display_name, description, tools)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (name) DO UPDATE
        SET display_name = EXCLUDED.display_name,
            description = EXCLUDED.description,
            tools = EXCLUDED.tools
        "#,
    )
    .bind(seed.name)
    .bind(seed.display_name)
    .bind(seed.description)
    .bind(&tools)
    .execute(pool)
    .await?;

    Ok(())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ToolRow {
    id: i64,
    name: String,
    display_name: String,
    category: String,
    description: Option<String>,
    script_path: String,
    icon: Option<String>,
    installed: bool,
    install_date: Option<DateTime<Utc>>,
}

impl From<ToolRow> for Tool {
    fn from(row: ToolRow) -> Self {
        Tool {
            id: row.id,
            name: row.name,
            display_name: row.display_name,
            category: row.category,
            description: row.description,
            script_path: row.script_path,
            icon: row.icon,
            installed: row.installed,
            install_date: row.install_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ToolSetRow {
    id: i64,
    name: String,
    display_name: String,
    description: Option<String>,
    tools: Vec<String>,
}

impl From<ToolSetRow> for ToolSet {
    fn from(row: ToolSetRow) -> Self {
        ToolSet {
            id: row.id,
            name: row.name,
            display_name: row.display_name,
            description: row.description,
            tools: row.tools,
        }
    }
}
