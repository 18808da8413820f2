//! PostgreSQL-backed job store and tool catalog
//!
//! Adapts the sqlx repositories to the traits the installer drives.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devsetup_core::domain::job::{Job, JobStatus};
use devsetup_core::domain::tool::Tool;
use devsetup_installer::repository::StoreResult;
use devsetup_installer::{JobStore, JobUpdate, StoreError, ToolCatalog};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{job_repository, tool_repository};

/// Job store and tool catalog over a connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl JobStore for PgStore {
    async fn create_job(&self, tool_id: i64, status: JobStatus) -> StoreResult<Uuid> {
        job_repository::create(&self.pool, tool_id, status)
            .await
            .map_err(backend)
    }

    async fn update_job(&self, id: Uuid, update: JobUpdate) -> StoreResult<()> {
        let written = job_repository::update(&self.pool, id, &update)
            .await
            .map_err(backend)?;
        if written {
            return Ok(());
        }

        // nothing written: tell a missing row apart from a rejected transition
        match job_repository::find_by_id(&self.pool, id)
            .await
            .map_err(backend)?
        {
            Some(job) => Err(StoreError::InvalidTransition {
                id,
                from: job.status,
                to: update.status,
            }),
            None => Err(StoreError::JobNotFound(id)),
        }
    }

    async fn get_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        job_repository::find_by_id(&self.pool, id)
            .await
            .map_err(backend)
    }

    async fn list_active_jobs(&self) -> StoreResult<Vec<Job>> {
        job_repository::find_active(&self.pool).await.map_err(backend)
    }
}

#[async_trait]
impl ToolCatalog for PgStore {
    async fn get_tool(&self, id: i64) -> StoreResult<Option<Tool>> {
        tool_repository::find_by_id(&self.pool, id)
            .await
            .map_err(backend)
    }

    async fn mark_installed(&self, id: i64, at: DateTime<Utc>) -> StoreResult<()> {
        let found = tool_repository::mark_installed(&self.pool, id, at)
            .await
            .map_err(backend)?;
        if found {
            Ok(())
        } else {
            Err(StoreError::ToolNotFound(id))
        }
    }
}
