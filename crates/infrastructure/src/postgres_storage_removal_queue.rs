use async_trait::async_trait;
use genoshare_application::{PendingStorageRemoval, StorageRemovalQueue, StorageRemovalRequest};
use genoshare_core::{AppError, AppResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const DEFAULT_MAX_ATTEMPTS: i32 = 12;
const MAX_BACKOFF_SECONDS: i64 = 1800;

/// PostgreSQL-backed retry queue for platform object removals.
#[derive(Clone)]
pub struct PostgresStorageRemovalQueue {
    pool: PgPool,
    max_attempts: i32,
}

impl PostgresStorageRemovalQueue {
    /// Creates a queue with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the attempts after which a row stays failed.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

#[derive(Debug, FromRow)]
struct ClaimedRemovalRow {
    id: Uuid,
    project: String,
    dxids: Vec<String>,
    attempt_count: i32,
    max_attempts: i32,
}

/// Seconds until the next attempt after `attempt_count` failures.
fn backoff_seconds(attempt_count: i32) -> AppResult<i32> {
    let capped_step = u32::try_from(attempt_count.clamp(0, 10)).map_err(|error| {
        AppError::Internal(format!("invalid removal attempt conversion: {error}"))
    })?;

    i32::try_from(2_i64.pow(capped_step).min(MAX_BACKOFF_SECONDS)).map_err(|error| {
        AppError::Internal(format!("invalid removal backoff conversion: {error}"))
    })
}

#[async_trait]
impl StorageRemovalQueue for PostgresStorageRemovalQueue {
    async fn enqueue(&self, request: StorageRemovalRequest) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO storage_removal_jobs (
                id,
                project,
                dxids,
                status,
                attempt_count,
                max_attempts,
                next_attempt_at,
                last_error
            )
            VALUES ($1, $2, $3, 'pending', 0, $4, now() + make_interval(secs => $5), $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.project.as_str())
        .bind(&request.dxids)
        .bind(self.max_attempts)
        .bind(backoff_seconds(0)?)
        .bind(request.last_error.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to enqueue object removal for project '{}': {error}",
                request.project
            ))
        })?;

        Ok(())
    }

    async fn claim_due(&self, limit: usize) -> AppResult<Vec<PendingStorageRemoval>> {
        let rows = sqlx::query_as::<_, ClaimedRemovalRow>(
            r#"
            WITH candidates AS (
                SELECT id
                FROM storage_removal_jobs
                WHERE status = 'pending'
                  AND next_attempt_at <= now()
                ORDER BY next_attempt_at ASC, created_at ASC
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE storage_removal_jobs AS jobs
            SET status = 'processing',
                updated_at = now(),
                next_attempt_at = now() + interval '2 minutes'
            FROM candidates
            WHERE jobs.id = candidates.id
            RETURNING jobs.id, jobs.project, jobs.dxids, jobs.attempt_count, jobs.max_attempts
            "#,
        )
        .bind(i64::try_from(limit).map_err(|error| {
            AppError::Internal(format!("invalid removal batch size conversion: {error}"))
        })?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to claim object removals: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| PendingStorageRemoval {
                id: row.id,
                project: row.project,
                dxids: row.dxids,
                attempt_count: row.attempt_count,
                max_attempts: row.max_attempts,
            })
            .collect())
    }

    async fn mark_completed(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM storage_removal_jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to complete object removal '{id}': {error}"))
        })?;

        Ok(())
    }

    async fn mark_failed(&self, removal: &PendingStorageRemoval, error: &str) -> AppResult<()> {
        let attempt_count = removal.attempt_count + 1;
        let next_status = if attempt_count >= removal.max_attempts {
            "failed"
        } else {
            "pending"
        };

        sqlx::query(
            r#"
            UPDATE storage_removal_jobs
            SET
                status = $2,
                attempt_count = $3,
                next_attempt_at = now() + make_interval(secs => $4),
                last_error = $5,
                last_attempt_at = now(),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(removal.id)
        .bind(next_status)
        .bind(attempt_count)
        .bind(backoff_seconds(attempt_count)?)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|update_error| {
            AppError::Internal(format!(
                "failed to update object removal retry state: {update_error}"
            ))
        })?;

        Ok(())
    }
}
