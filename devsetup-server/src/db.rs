use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create tools table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tools (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            display_name VARCHAR(255) NOT NULL,
            category VARCHAR(255) NOT NULL,
            description TEXT,
            script_path TEXT NOT NULL,
            icon VARCHAR(255),
            installed BOOLEAN NOT NULL DEFAULT FALSE,
            install_date TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create tool sets table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tool_sets (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            display_name VARCHAR(255) NOT NULL,
            description TEXT,
            tools TEXT[] NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create installations table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS installations (
            id UUID PRIMARY KEY,
            tool_id BIGINT NOT NULL REFERENCES tools(id) ON DELETE CASCADE,
            status VARCHAR(50) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            started_at TIMESTAMPTZ,
            completed_at TIMESTAMPTZ,
            log TEXT,
            error_message TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_installations_status ON installations(status)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_installations_created_at ON installations(created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tools_category ON tools(category)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
