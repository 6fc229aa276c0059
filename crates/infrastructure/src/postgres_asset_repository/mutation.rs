use sqlx::{Postgres, Transaction};

use super::*;

/// Unit of work holding row locks until commit or drop.
pub(super) struct PostgresAssetMutation {
    transaction: Transaction<'static, Postgres>,
}

impl PostgresAssetMutation {
    pub(super) fn new(transaction: Transaction<'static, Postgres>) -> Self {
        Self { transaction }
    }
}

#[async_trait]
impl AssetMutation for PostgresAssetMutation {
    async fn reload_for_update(&mut self, asset_id: AssetId) -> AppResult<Option<Asset>> {
        let sql = format!(
            "SELECT {ASSET_COLUMNS} FROM assets LEFT JOIN licenses ON licenses.id = assets.license_id \
             WHERE assets.id = $1 FOR UPDATE OF assets"
        );
        let row = sqlx::query_as::<_, AssetRow>(sql.as_str())
            .bind(asset_id.as_uuid())
            .fetch_optional(&mut *self.transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to lock asset '{asset_id}': {error}"))
            })?;

        row.map(AssetRow::into_asset).transpose()
    }

    async fn find_access_grant(
        &mut self,
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
        .fetch_optional(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load access grant on asset '{asset_id}': {error}"
            ))
        })?;

        parse_grant(level)
    }

    async fn count_dependent_apps(&mut self, asset_id: AssetId) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM app_assets
            WHERE asset_id = $1
            "#,
        )
        .bind(asset_id.as_uuid())
        .fetch_one(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to count apps depending on asset '{asset_id}': {error}"
            ))
        })?;

        u64::try_from(count).map_err(|error| {
            AppError::Internal(format!("invalid dependent app count: {error}"))
        })
    }

    async fn save_asset(&mut self, asset: &Asset) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE assets
            SET name = $2, description = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(asset.id().as_uuid())
        .bind(asset.name().as_str())
        .bind(asset.description())
        .bind(asset.updated_at())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to save asset '{}': {error}", asset.dxid()))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "asset '{}' does not exist",
                asset.dxid()
            )));
        }

        Ok(())
    }

    async fn delete_asset(&mut self, asset_id: AssetId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM assets
            WHERE id = $1
            "#,
        )
        .bind(asset_id.as_uuid())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete asset '{asset_id}': {error}"))
        })?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }
}
