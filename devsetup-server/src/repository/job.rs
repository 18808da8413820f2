//! Job Repository
//!
//! Handles all database operations related to installation jobs.

use devsetup_core::domain::job::{Job, JobStatus};
use devsetup_installer::JobUpdate;
use sqlx::PgPool;
use uuid::Uuid;

const ALL_STATUSES: [JobStatus; 5] = [
    JobStatus::Pending,
    JobStatus::Running,
    JobStatus::Completed,
    JobStatus::Failed,
    JobStatus::Cancelled,
];

/// Create a new job in the database
pub async fn create(pool: &PgPool, tool_id: i64, status: JobStatus) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO installations (id, tool_id, status, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(tool_id)
    .bind(status.as_str())
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Apply a status transition
///
/// The row is only written while its current status may move to
/// `update.status`. Returns false when nothing was written, either because
/// the job does not exist or because the transition is not allowed.
pub async fn update(pool: &PgPool, id: Uuid, update: &JobUpdate) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE installations
        SET status = $1,
            started_at = COALESCE($2, started_at),
            completed_at = COALESCE($3, completed_at),
            log = COALESCE($4, log),
            error_message = COALESCE($5, error_message)
        WHERE id = $6 AND status = ANY($7)
        "#,
    )
    .bind(update.status.as_str())
    .bind(update.started_at)
    .bind(update.completed_at)
    .bind(&update.log)
    .bind(&update.error_message)
    .bind(id)
    .bind(allowed_from(update.status))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Find a job by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT id, tool_id, status, created_at, started_at, completed_at, log, error_message
        FROM installations
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Find jobs that are pending or running, oldest first
pub async fn find_active(pool: &PgPool) -> Result<Vec<Job>, sqlx::Error> {
    let rows = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT id, tool_id, status, created_at, started_at, completed_at, log, error_message
        FROM installations
        WHERE status = ANY($1)
        ORDER BY created_at ASC
        "#,
    )
    .bind(
        ALL_STATUSES
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.as_str().to_string())
            .collect::<Vec<_>>(),
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Close out jobs left unfinished by a previous process
///
/// Scripts never resume after a restart. Jobs that were running are marked
/// failed and jobs that never started are cancelled.
///
/// # Returns
/// The number of failed and cancelled jobs
pub async fn close_abandoned(pool: &PgPool) -> Result<(u64, u64), sqlx::Error> {
    let now = chrono::Utc::now();

    let failed = sqlx::query(
        r#"
        UPDATE installations
        SET status = $1, completed_at = $2, error_message = $3
        WHERE status = $4
        "#,
    )
    .bind(JobStatus::Failed.as_str())
    .bind(now)
    .bind("interrupted by server restart")
    .bind(JobStatus::Running.as_str())
    .execute(pool)
    .await?;

    let cancelled = sqlx::query(
        r#"
        UPDATE installations
        SET status = $1, completed_at = $2
        WHERE status = $3
        "#,
    )
    .bind(JobStatus::Cancelled.as_str())
    .bind(now)
    .bind(JobStatus::Pending.as_str())
    .execute(pool)
    .await?;

    Ok((failed.rows_affected(), cancelled.rows_affected()))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Statuses a job may be in for a write of `to` to be accepted
fn allowed_from(to: JobStatus) -> Vec<String> {
    ALL_STATUSES
        .iter()
        .filter(|from| from.can_transition_to(to))
        .map(|from| from.as_str().to_string())
        .collect()
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    tool_id: i64,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    log: Option<String>,
    error_message: Option<String>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            tracing::warn!("Job {} has {}, reading it as failed", row.id, e);
            JobStatus::Failed
        });

        Job {
            id: row.id,
            tool_id: row.tool_id,
            status,
            created_at: row.created_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
            log: row.log,
            error_message: row.error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_from() {
        assert_eq!(allowed_from(JobStatus::Running), vec!["pending"]);
        assert_eq!(allowed_from(JobStatus::Cancelled), vec!["pending"]);
        assert_eq!(allowed_from(JobStatus::Completed), vec!["running"]);
        assert_eq!(allowed_from(JobStatus::Failed), vec!["running"]);
        assert!(allowed_from(JobStatus::Pending).is_empty());
    }

    #[test]
    fn test_row_conversion() {
        let id = Uuid::new_v4();
        let row = JobRow {
            id,
            tool_id: 7,
            status: "cancelled".to_string(),
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            log: None,
            error_message: None,
        };

        let job: Job = row.into();
        assert_eq!(job.id, id);
        assert_eq!(job.tool_id, 7);
        assert_eq!(job.status, JobStatus::Cancelled);
    }
}
