//! Application services and ports.

#![forbid(unsafe_code)]

mod asset_ports;
mod asset_service;
mod asset_sync_service;
mod directory_ports;
mod event_ports;
mod event_service;
mod platform_ports;
mod storage_removal_service;

pub use asset_ports::{
    AssetListQuery, AssetListingRow, AssetMutation, AssetRepository, AssetStateUpdate,
};
pub use asset_service::{
    AssetDownload, AssetService, AssetServiceSettings, DestroyedAsset,
    LICENSE_DEPENDENCY_MESSAGE, RenameAssetInput, StorageRemovalStatus, UpdateAssetInput,
};
pub use asset_sync_service::AssetSyncService;
pub use directory_ports::UserDirectory;
pub use event_ports::{EventQuery, EventRepository};
pub use event_service::EventService;
pub use platform_ports::{
    AssetStateSync, PendingStorageRemoval, RemoteObjectState, StoragePlatform,
    StorageRemovalQueue, StorageRemovalRequest,
};
pub use storage_removal_service::{StorageRemovalBatch, StorageRemovalService};
