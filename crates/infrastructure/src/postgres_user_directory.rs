use async_trait::async_trait;
use genoshare_application::UserDirectory;
use genoshare_core::{AppError, AppResult, ContextUser, OrganizationId, UserId};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// PostgreSQL-backed lookup of platform users.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DirectoryUserRow {
    id: Uuid,
    dxuser: String,
    organization_id: Option<Uuid>,
    org_handle: Option<String>,
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user_by_dxuser(&self, dxuser: &str) -> AppResult<Option<ContextUser>> {
        let row = sqlx::query_as::<_, DirectoryUserRow>(
            r#"
            SELECT users.id, users.dxuser, users.organization_id, organizations.handle AS org_handle
            FROM users
            LEFT JOIN organizations ON organizations.id = users.organization_id
            WHERE users.dxuser = $1
            "#,
        )
        .bind(dxuser)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find user '{dxuser}': {error}"))
        })?;

        Ok(row.map(|value| {
            ContextUser::new(
                UserId::from_uuid(value.id),
                value.dxuser,
                value.organization_id.map(OrganizationId::from_uuid),
                value.org_handle,
            )
        }))
    }
}
