use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use genoshare_core::{AppResult, RequestContext};
use genoshare_domain::Asset;
use tracing::debug;

use crate::asset_ports::{AssetRepository, AssetStateUpdate};
use crate::platform_ports::{AssetStateSync, StoragePlatform};

/// Refreshes mirrored asset state from the storage platform.
#[derive(Clone)]
pub struct AssetSyncService {
    repository: Arc<dyn AssetRepository>,
    storage_platform: Arc<dyn StoragePlatform>,
}

impl AssetSyncService {
    /// Creates a new sync service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AssetRepository>,
        storage_platform: Arc<dyn StoragePlatform>,
    ) -> Self {
        Self {
            repository,
            storage_platform,
        }
    }

    async fn refresh(&self, token: &str, assets: Vec<Asset>) -> AppResult<u64> {
        if assets.is_empty() {
            return Ok(0);
        }

        let ids_by_dxid: HashMap<String, _> = assets
            .iter()
            .map(|asset| (asset.dxid().to_owned(), asset.id()))
            .collect();
        let dxids: Vec<String> = ids_by_dxid.keys().cloned().collect();

        let remote = self
            .storage_platform
            .describe_object_states(token, &dxids)
            .await?;

        let updates: Vec<AssetStateUpdate> = remote
            .into_iter()
            .filter_map(|object| {
                ids_by_dxid
                    .get(object.dxid.as_str())
                    .map(|asset_id| AssetStateUpdate {
                        asset_id: *asset_id,
                        state: object.state,
                    })
            })
            .collect();

        if updates.is_empty() {
            return Ok(0);
        }

        self.repository.apply_state_updates(updates).await
    }
}

#[async_trait]
impl AssetStateSync for AssetSyncService {
    async fn sync_assets(&self, context: &RequestContext) -> AppResult<()> {
        let (Some(user_id), Some(token)) = (context.user_id(), context.platform_token()) else {
            return Ok(());
        };

        let assets = self.repository.list_unclosed_assets(user_id).await?;
        let updated = self.refresh(token, assets).await?;
        debug!(user_id = %user_id, updated, "asset states refreshed");
        Ok(())
    }

    async fn sync_asset(&self, context: &RequestContext, asset: &Asset) -> AppResult<()> {
        if asset.state().is_closed() {
            return Ok(());
        }
        let Some(token) = context.platform_token().filter(|_| !context.is_guest()) else {
            return Ok(());
        };

        self.refresh(token, vec![asset.clone()]).await?;
        Ok(())
    }
}
