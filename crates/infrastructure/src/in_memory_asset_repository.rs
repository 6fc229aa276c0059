use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use genoshare_application::{
    AssetListQuery, AssetListingRow, AssetMutation, AssetRepository, AssetStateUpdate,
};
use genoshare_core::{AppError, AppResult, AssetId, OrganizationId, RequestContext, UserId};
use genoshare_domain::{
    AccessGrantLevel, Asset, AssetListing, Organization, Page, Tag, UserSummary,
};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};


#[derive(Debug, Default, Clone)]
struct AssetStore {
    organizations: HashMap<OrganizationId, Organization>,
    users: HashMap<UserId, UserSummary>,
    memberships: HashMap<UserId, OrganizationId>,
    assets: HashMap<AssetId, Asset>,
    tags: HashMap<AssetId, Vec<Tag>>,
    grants: HashMap<(AssetId, UserId), AccessGrantLevel>,
    dependent_apps: HashMap<AssetId, u64>,
}

impl AssetStore {
    fn listing(&self, asset: &Asset) -> AppResult<AssetListing> {
        let owner = self
            .users
            .get(&asset.owner_user_id())
            .cloned()
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "owner '{}' of asset '{}' is missing",
                    asset.owner_user_id(),
                    asset.dxid()
                ))
            })?;
        let organization = self
            .memberships
            .get(&asset.owner_user_id())
            .and_then(|organization_id| self.organizations.get(organization_id))
            .cloned();
        let tags = self.tags.get(&asset.id()).cloned().unwrap_or_default();

        Ok(AssetListing::new(asset.clone(), owner, organization, tags))
    }

    fn grant(&self, asset_id: AssetId, user_id: Option<UserId>) -> Option<AccessGrantLevel> {
        user_id.and_then(|user_id| self.grants.get(&(asset_id, user_id)).copied())
    }
}

/// In-memory asset repository.
///
/// Mutations take the store-wide write lock for their whole unit of work and
/// publish a staged copy on commit.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAssetRepository {
    store: Arc<RwLock<AssetStore>>,
}

impl InMemoryAssetRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an organization.
    pub async fn add_organization(&self, organization: Organization) {
        self.store
            .write()
            .await
            .organizations
            .insert(organization.id(), organization);
    }

    /// Registers an asset owner.
    pub async fn add_user(&self, user: UserSummary) {
        self.store.write().await.users.insert(user.id(), user);
    }

    /// Moves a user into an organization.
    pub async fn assign_organization(&self, user_id: UserId, organization_id: OrganizationId) {
        self.store
            .write()
            .await
            .memberships
            .insert(user_id, organization_id);
    }

    /// Stores an asset with its tags.
    pub async fn add_asset(&self, asset: Asset, tags: Vec<Tag>) -> AppResult<()> {
        let mut store = self.store.write().await;

        if !store.users.contains_key(&asset.owner_user_id()) {
            return Err(AppError::Validation(format!(
                "owner '{}' of asset '{}' is unknown",
                asset.owner_user_id(),
                asset.dxid()
            )));
        }

        if store
            .assets
            .values()
            .any(|stored| stored.dxid() == asset.dxid())
        {
            return Err(AppError::Conflict(format!(
                "asset '{}' already exists",
                asset.dxid()
            )));
        }

        store.tags.insert(asset.id(), tags);
        store.assets.insert(asset.id(), asset);
        Ok(())
    }

    /// Shares an asset with a user.
    pub async fn grant_access(&self, asset_id: AssetId, user_id: UserId, level: AccessGrantLevel) {
        self.store
            .write()
            .await
            .grants
            .insert((asset_id, user_id), level);
    }

    /// Records an app that bundles the asset.
    pub async fn add_dependent_app(&self, asset_id: AssetId) {
        *self
            .store
            .write()
            .await
            .dependent_apps
            .entry(asset_id)
            .or_default() += 1;
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssetRepository {
    async fn list_assets(
        &self,
        context: &RequestContext,
        query: AssetListQuery,
    ) -> AppResult<Page<AssetListingRow>> {
        let store = self.store.read().await;

        let mut rows = Vec::new();
        for asset in store.assets.values() {
            let grant = store.grant(asset.id(), context.user_id());
            if !query.visibility.allows(context, asset, grant) {
                continue;
            }

            let listing = store.listing(asset)?;
            if query.filter.matches(&listing) {
                rows.push(AssetListingRow { listing, grant });
            }
        }
        rows.sort_by(|left, right| query.page.sort().compare(&left.listing, &right.listing));

        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(usize::try_from(query.page.offset()).unwrap_or(usize::MAX))
            .take(query.page.limit() as usize)
            .collect();

        Ok(Page {
            items,
            page: query.page.page(),
            page_size: query.page.limit(),
            total,
        })
    }

    async fn find_asset(&self, dxid: &str) -> AppResult<Option<AssetListing>> {
        let store = self.store.read().await;
        store
            .assets
            .values()
            .find(|asset| asset.dxid() == dxid)
            .map(|asset| store.listing(asset))
            .transpose()
    }

    async fn find_access_grant(
        &self,
        asset_id: AssetId,
        user_id: UserId,
    ) -> AppResult<Option<AccessGrantLevel>> {
        Ok(self.store.read().await.grant(asset_id, Some(user_id)))
    }

    async fn find_organization_by_handle(&self, handle: &str) -> AppResult<Option<Organization>> {
        Ok(self
            .store
            .read()
            .await
            .organizations
            .values()
            .find(|organization| organization.handle() == handle)
            .cloned())
    }

    async fn list_unclosed_assets(&self, owner_user_id: UserId) -> AppResult<Vec<Asset>> {
        let store = self.store.read().await;
        let mut assets: Vec<Asset> = store
            .assets
            .values()
            .filter(|asset| asset.owner_user_id() == owner_user_id && !asset.state().is_closed())
            .cloned()
            .collect();
        assets.sort_by(|left, right| left.dxid().cmp(right.dxid()));

        Ok(assets)
    }

    async fn apply_state_updates(&self, updates: Vec<AssetStateUpdate>) -> AppResult<u64> {
        let mut store = self.store.write().await;

        let mut updated = 0_u64;
        for update in updates {
            if let Some(asset) = store.assets.get_mut(&update.asset_id)
                && asset.refresh_state(update.state)
            {
                updated += 1;
            }
        }

        Ok(updated)
    }

    async fn begin_mutation(&self) -> AppResult<Box<dyn AssetMutation>> {
        let guard = Arc::clone(&self.store).write_owned().await;
        let staged = guard.clone();

        Ok(Box::new(InMemoryAssetMutation { guard, staged }))
    }
}

struct InMemoryAssetMutation {
    guard: OwnedRwLockWriteGuard<AssetStore>,
    staged: AssetStore,
}

#[async_trait]
impl AssetMutation for InMemoryAssetMutation {
    async fn reload_for_update(&mut self, asset_id: AssetId) -> AppResult<Option<Asset>> {
        Ok(self.staged.assets.get(&asset_id).cloned())
    }

    async fn find_access_grant(
        &mut self,
        asset_id: AssetId,
        user_id: UserId,
    ) -> AppResult<Option<AccessGrantLevel>> {
        Ok(self.staged.grant(asset_id, Some(user_id)))
    }

    async fn count_dependent_apps(&mut self, asset_id: AssetId) -> AppResult<u64> {
        Ok(self
            .staged
            .dependent_apps
            .get(&asset_id)
            .copied()
            .unwrap_or_default())
    }

    async fn save_asset(&mut self, asset: &Asset) -> AppResult<()> {
        let Some(stored) = self.staged.assets.get_mut(&asset.id()) else {
            return Err(AppError::NotFound(format!(
                "asset '{}' does not exist",
                asset.dxid()
            )));
        };

        *stored = asset.clone();
        Ok(())
    }

    async fn delete_asset(&mut self, asset_id: AssetId) -> AppResult<()> {
        self.staged.assets.remove(&asset_id);
        self.staged.tags.remove(&asset_id);
        self.staged.dependent_apps.remove(&asset_id);
        self.staged.grants.retain(|(granted_asset_id, _), _| *granted_asset_id != asset_id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}
