use async_trait::async_trait;
use chrono::{DateTime, Utc};
use genoshare_application::{EventQuery, EventRepository};
use genoshare_core::{AppError, AppResult};
use genoshare_domain::{Event, EventPayload};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// PostgreSQL-backed append-only event log.
#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    occurred_at: DateTime<Utc>,
    dxuser: String,
    org_handle: Option<String>,
    payload: Json<EventPayload>,
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn append_event(&self, event: Event) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, kind, occurred_at, dxuser, org_handle, payload)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id())
        .bind(event.kind().as_str())
        .bind(event.occurred_at())
        .bind(event.dxuser())
        .bind(event.org_handle())
        .bind(Json(event.payload()))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to append {} event: {error}",
                event.kind().as_str()
            ))
        })?;

        Ok(())
    }

    async fn list_events(&self, query: EventQuery) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, occurred_at, dxuser, org_handle, payload
            FROM events
            WHERE ($1::text IS NULL OR kind = $1)
            ORDER BY occurred_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(query.kind.map(|kind| kind.as_str()))
        .bind(i64::try_from(query.limit).map_err(|error| {
            AppError::Validation(format!("invalid event limit: {error}"))
        })?)
        .bind(i64::try_from(query.offset).map_err(|error| {
            AppError::Validation(format!("invalid event offset: {error}"))
        })?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list events: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Event::from_parts(
                    row.id,
                    row.occurred_at,
                    row.dxuser,
                    row.org_handle,
                    row.payload.0,
                )
            })
            .collect()
    }
}
