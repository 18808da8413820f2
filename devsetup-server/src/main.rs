use std::sync::Arc;

use anyhow::Context;
use devsetup_installer::{Installer, ShellExecutor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;
pub mod state;
pub mod store;

use config::Config;
use state::AppState;
use store::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "devsetup_server=debug,devsetup_installer=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Devsetup Server...");

    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;

    if !config.scripts_dir.is_dir() {
        tracing::warn!(
            "Scripts directory {} does not exist, installs will fail",
            config.scripts_dir.display()
        );
    }

    tracing::info!("Connecting to database...");

    // Create database connection pool
    let pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Database connection pool created");

    // Run migrations
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    catalog::seed(&pool)
        .await
        .context("Failed to seed tool catalog")?;

    let (failed, cancelled) = repository::job_repository::close_abandoned(&pool)
        .await
        .context("Failed to close abandoned jobs")?;
    if failed + cancelled > 0 {
        tracing::warn!(
            "Closed jobs left by a previous run: {} failed, {} cancelled",
            failed,
            cancelled
        );
    }

    let store = Arc::new(PgStore::new(pool.clone()));
    let executor = Arc::new(ShellExecutor::new(config.installer.clone()));
    let installer = Arc::new(Installer::new(store.clone(), store, executor));

    // Build router with all API endpoints
    let app = api::create_router(AppState {
        pool,
        installer,
        scripts_dir: config.scripts_dir.clone(),
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
