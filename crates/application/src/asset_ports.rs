use async_trait::async_trait;
use genoshare_core::{AppResult, AssetId, RequestContext, UserId};
use genoshare_domain::{
    AccessGrantLevel, Asset, AssetFilter, AssetListing, AssetState, Organization, Page,
    PageRequest, VisibilityFilter,
};

/// Listing request compiled by storage adapters into one filtered query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetListQuery {
    /// Predicate every row must satisfy for the caller.
    pub visibility: VisibilityFilter,
    /// Additional narrowing.
    pub filter: AssetFilter,
    /// Page and ordering.
    pub page: PageRequest,
}

/// Listing row together with the caller's explicit share on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetListingRow {
    /// Asset with owner, organization and tags attached.
    pub listing: AssetListing,
    /// Caller's explicit grant, if any.
    pub grant: Option<AccessGrantLevel>,
}

/// State refreshed from the storage platform for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetStateUpdate {
    /// Asset to update.
    pub asset_id: AssetId,
    /// New remote state.
    pub state: AssetState,
}

/// Repository port for assets and their visibility data.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Lists assets satisfying the query's visibility predicate for the caller.
    async fn list_assets(
        &self,
        context: &RequestContext,
        query: AssetListQuery,
    ) -> AppResult<Page<AssetListingRow>>;

    /// Finds one asset with its listing associations by remote object id.
    async fn find_asset(&self, dxid: &str) -> AppResult<Option<AssetListing>>;

    /// Returns a user's explicit share on an asset.
    async fn find_access_grant(
        &self,
        asset_id: AssetId,
        user_id: UserId,
    ) -> AppResult<Option<AccessGrantLevel>>;

    /// Finds an organization by handle.
    async fn find_organization_by_handle(&self, handle: &str) -> AppResult<Option<Organization>>;

    /// Lists an owner's assets whose remote state is not final yet.
    async fn list_unclosed_assets(&self, owner_user_id: UserId) -> AppResult<Vec<Asset>>;

    /// Applies refreshed states; closed assets are left untouched. Returns updated rows.
    async fn apply_state_updates(&self, updates: Vec<AssetStateUpdate>) -> AppResult<u64>;

    /// Opens a transactional unit of work for one mutation.
    async fn begin_mutation(&self) -> AppResult<Box<dyn AssetMutation>>;
}

/// Transactional unit of work over asset rows.
///
/// Dropping the value without calling [`AssetMutation::commit`] rolls back
/// every staged change.
#[async_trait]
pub trait AssetMutation: Send {
    /// Re-reads an asset and locks it until the unit of work ends.
    async fn reload_for_update(&mut self, asset_id: AssetId) -> AppResult<Option<Asset>>;

    /// Returns a user's explicit share on an asset as seen by this unit of work.
    async fn find_access_grant(
        &mut self,
        asset_id: AssetId,
        user_id: UserId,
    ) -> AppResult<Option<AccessGrantLevel>>;

    /// Counts apps that reference the asset.
    async fn count_dependent_apps(&mut self, asset_id: AssetId) -> AppResult<u64>;

    /// Persists the mutable fields of an asset.
    async fn save_asset(&mut self, asset: &Asset) -> AppResult<()>;

    /// Deletes an asset with its taggings and grants.
    async fn delete_asset(&mut self, asset_id: AssetId) -> AppResult<()>;

    /// Commits every staged change.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
