use std::sync::Arc;

use genoshare_core::{AppError, AppResult, RequestContext};
use genoshare_domain::{
    AccessGrantLevel, Asset, AssetFilter, AssetListing, Page, PageRequest, VisibilityFilter,
    is_editable, is_readable,
};
use tracing::{info, warn};

use crate::asset_ports::{AssetListQuery, AssetMutation, AssetRepository};
use crate::platform_ports::{
    AssetStateSync, StoragePlatform, StorageRemovalQueue, StorageRemovalRequest,
};
use crate::EventService;

mod access;
mod download;
mod listing;
mod mutation;

/// Message shown when a destroy is blocked by licensed app dependencies.
pub const LICENSE_DEPENDENCY_MESSAGE: &str = "This asset contains a license, and has been included in one or more apps. Deleting it would render the license inaccessible to these apps, breaking reproducibility. You can either first remove the license (allowing these existing apps to run without requiring a license) or contact the site team to discuss other options.";

/// Input payload for renaming an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameAssetInput {
    /// New title; `None` when the caller sent something other than a string.
    pub title: Option<String>,
}

/// Input payload for updating an asset. Only these fields are writable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateAssetInput {
    /// New description; blank clears it.
    pub description: Option<String>,
    /// New title; the archive extension is kept.
    pub title: Option<String>,
}

/// Outcome of the storage-side cleanup after a destroy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageRemovalStatus {
    /// Platform objects were removed inline.
    Completed,
    /// Inline removal failed and was queued for retry.
    Deferred,
}

/// Result of a committed destroy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyedAsset {
    /// Asset as it was when deleted.
    pub asset: Asset,
    /// Storage cleanup outcome.
    pub storage_removal: StorageRemovalStatus,
}

/// Download link handed out for a readable asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDownload {
    /// Downloaded asset.
    pub asset: Asset,
    /// Pre-authenticated platform URL.
    pub url: String,
}

/// Static settings for the asset service.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AssetServiceSettings {
    /// Handle of the organization whose assets are featured.
    pub featured_organization_handle: Option<String>,
    /// Platform token used for object removal when the caller has none.
    pub platform_admin_token: Option<String>,
}

impl std::fmt::Debug for AssetServiceSettings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AssetServiceSettings")
            .field(
                "featured_organization_handle",
                &self.featured_organization_handle,
            )
            .field(
                "platform_admin_token",
                &self.platform_admin_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Application service for asset listing, access checks and mutations.
#[derive(Clone)]
pub struct AssetService {
    repository: Arc<dyn AssetRepository>,
    state_sync: Arc<dyn AssetStateSync>,
    storage_platform: Arc<dyn StoragePlatform>,
    removal_queue: Arc<dyn StorageRemovalQueue>,
    event_service: EventService,
    settings: AssetServiceSettings,
}

impl AssetService {
    /// Creates a new asset service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AssetRepository>,
        state_sync: Arc<dyn AssetStateSync>,
        storage_platform: Arc<dyn StoragePlatform>,
        removal_queue: Arc<dyn StorageRemovalQueue>,
        event_service: EventService,
        settings: AssetServiceSettings,
    ) -> Self {
        Self {
            repository,
            state_sync,
            storage_platform,
            removal_queue,
            event_service,
            settings,
        }
    }
}

fn not_permitted(dxid: &str) -> AppError {
    AppError::Forbidden(format!("asset '{dxid}' is not available to the caller"))
}

fn missing(dxid: &str) -> AppError {
    AppError::NotFound(format!("asset '{dxid}' does not exist"))
}
