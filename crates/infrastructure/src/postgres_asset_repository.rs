use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use genoshare_application::{
    AssetListQuery, AssetListingRow, AssetMutation, AssetRepository, AssetStateUpdate,
};
use genoshare_core::{AppError, AppResult, AssetId, OrganizationId, RequestContext, UserId};
use genoshare_domain::{
    AccessGrantLevel, Asset, AssetAttributes, AssetListing, AssetScope, AssetState, LicenseRef,
    Organization, Page, Tag, UserSummary,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

mod listing;
mod mutation;

#[cfg(test)]
mod tests;

use mutation::PostgresAssetMutation;

/// Columns of `assets` joined with its license.
const ASSET_COLUMNS: &str = r#"
    assets.id,
    assets.dxid,
    assets.project,
    assets.name,
    assets.description,
    assets.user_id,
    assets.organization_id,
    assets.scope,
    assets.state,
    licenses.uid AS license_uid,
    licenses.title AS license_title,
    licenses.content AS license_content,
    assets.file_size,
    assets.created_at,
    assets.updated_at
"#;

/// Owner and organization columns rendered with every listing row.
const LISTING_COLUMNS: &str = r#"
    owners.dxuser AS owner_dxuser,
    TRIM(owners.first_name || ' ' || owners.last_name) AS owner_full_name,
    organizations.id AS org_id,
    organizations.handle AS org_handle,
    organizations.name AS org_name
"#;

const LISTING_JOINS: &str = r#"
    FROM assets
    JOIN users AS owners ON owners.id = assets.user_id
    LEFT JOIN organizations ON organizations.id = owners.organization_id
    LEFT JOIN licenses ON licenses.id = assets.license_id
"#;

/// PostgreSQL-backed asset repository.
#[derive(Clone)]
pub struct PostgresAssetRepository {
    pool: PgPool,
}

impl PostgresAssetRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_tags(&self, asset_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<Tag>>> {
        if asset_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT taggings.asset_id, tags.name
            FROM taggings
            JOIN tags ON tags.id = taggings.tag_id
            WHERE taggings.asset_id = ANY($1)
            "#,
        )
        .bind(asset_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load asset tags: {error}")))?;

        let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in rows {
            tags.entry(row.asset_id).or_default().push(Tag::new(row.name)?);
        }

        Ok(tags)
    }
}

#[derive(Debug, FromRow)]
struct AssetRow {
    id: Uuid,
    dxid: String,
    project: String,
    name: String,
    description: Option<String>,
    user_id: Uuid,
    organization_id: Option<Uuid>,
    scope: String,
    state: String,
    license_uid: Option<String>,
    license_title: Option<String>,
    license_content: Option<String>,
    file_size: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AssetRow {
    fn into_asset(self) -> AppResult<Asset> {
        let license = match (self.license_uid, self.license_title) {
            (Some(uid), Some(title)) => Some(LicenseRef::new(
                uid,
                title,
                self.license_content.unwrap_or_default(),
            )?),
            _ => None,
        };

        Asset::from_attributes(AssetAttributes {
            id: AssetId::from_uuid(self.id),
            dxid: self.dxid,
            project: self.project,
            name: self.name,
            description: self.description,
            owner_user_id: UserId::from_uuid(self.user_id),
            owner_organization_id: self.organization_id.map(OrganizationId::from_uuid),
            scope: AssetScope::from_str(self.scope.as_str())?,
            state: AssetState::from_str(self.state.as_str())?,
            license,
            file_size: self.file_size,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ListingRow {
    #[sqlx(flatten)]
    asset: AssetRow,
    owner_dxuser: String,
    owner_full_name: String,
    org_id: Option<Uuid>,
    org_handle: Option<String>,
    org_name: Option<String>,
}

impl ListingRow {
    fn into_listing(self, tags: Vec<Tag>) -> AppResult<AssetListing> {
        let owner = UserSummary::new(
            UserId::from_uuid(self.asset.user_id),
            self.owner_dxuser,
            self.owner_full_name,
        )?;
        let organization = match (self.org_id, self.org_handle, self.org_name) {
            (Some(id), Some(handle), Some(name)) => Some(Organization::new(
                OrganizationId::from_uuid(id),
                handle,
                name,
            )?),
            _ => None,
        };

        Ok(AssetListing::new(
            self.asset.into_asset()?,
            owner,
            organization,
            tags,
        ))
    }
}

#[derive(Debug, FromRow)]
struct TagRow {
    asset_id: Uuid,
    name: String,
}

#[derive(Debug, FromRow)]
struct OrganizationRow {
    id: Uuid,
    handle: String,
    name: String,
}

fn parse_grant(level: Option<String>) -> AppResult<Option<AccessGrantLevel>> {
    level
        .map(|value| AccessGrantLevel::from_str(value.as_str()))
        .transpose()
}

#[async_trait]
impl AssetRepository for PostgresAssetRepository {
    async fn list_assets(
        &self,
        context: &RequestContext,
        query: AssetListQuery,
    ) -> AppResult<Page<AssetListingRow>> {
        self.list_assets_impl(context, query).await
    }

    async fn find_asset(&self, dxid: &str) -> AppResult<Option<AssetListing>> {
        let sql = format!("SELECT {ASSET_COLUMNS}, {LISTING_COLUMNS} {LISTING_JOINS} WHERE assets.dxid = $1");
        let row = sqlx::query_as::<_, ListingRow>(sql.as_str())
            .bind(dxid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to find asset '{dxid}': {error}"))
            })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut tags = self.load_tags(&[row.asset.id]).await?;
        let asset_tags = tags.remove(&row.asset.id).unwrap_or_default();
        row.into_listing(asset_tags).map(Some)
    }

    async fn find_access_grant(
        &self,
        asset_id: AssetId,
        user_id: UserId,
    ) -> AppResult<Option<AccessGrantLevel>> {
        let level = sqlx::query_scalar::<_, String>(
            r#"
            SELECT level
            FROM asset_access_grants
            WHERE asset_id = $1 AND user_id = $2
            "#,
        )
        .bind(asset_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load access grant on asset '{asset_id}': {error}"
            ))
        })?;

        parse_grant(level)
    }

    async fn find_organization_by_handle(&self, handle: &str) -> AppResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT id, handle, name
            FROM organizations
            WHERE handle = $1
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find organization '{handle}': {error}"))
        })?;

        row.map(|value| {
            Organization::new(OrganizationId::from_uuid(value.id), value.handle, value.name)
        })
        .transpose()
    }

    async fn list_unclosed_assets(&self, owner_user_id: UserId) -> AppResult<Vec<Asset>> {
        let sql = format!(
            "SELECT {ASSET_COLUMNS} FROM assets LEFT JOIN licenses ON licenses.id = assets.license_id \
             WHERE assets.user_id = $1 AND assets.state <> 'closed' ORDER BY assets.dxid"
        );
        let rows = sqlx::query_as::<_, AssetRow>(sql.as_str())
            .bind(owner_user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to list unclosed assets for user '{owner_user_id}': {error}"
                ))
            })?;

        rows.into_iter().map(AssetRow::into_asset).collect()
    }

    async fn apply_state_updates(&self, updates: Vec<AssetStateUpdate>) -> AppResult<u64> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let mut updated = 0_u64;
        for update in &updates {
            let result = sqlx::query(
                r#"
                UPDATE assets
                SET state = $2, updated_at = now()
                WHERE id = $1 AND state <> 'closed' AND state <> $2
                "#,
            )
            .bind(update.asset_id.as_uuid())
            .bind(update.state.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to refresh state of asset '{}': {error}",
                    update.asset_id
                ))
            })?;
            updated += result.rows_affected();
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(updated)
    }

    async fn begin_mutation(&self) -> AppResult<Box<dyn AssetMutation>> {
        let transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        Ok(Box::new(PostgresAssetMutation::new(transaction)))
    }
}
