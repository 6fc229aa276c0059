//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod dnanexus_platform_client;
mod in_memory_asset_repository;
mod in_memory_event_repository;
mod in_memory_storage_removal_queue;
mod in_memory_user_directory;
mod platform_config;
mod postgres_asset_repository;
mod postgres_event_repository;
mod postgres_storage_removal_queue;
mod postgres_user_directory;

pub use dnanexus_platform_client::DnanexusPlatformClient;
pub use in_memory_asset_repository::InMemoryAssetRepository;
pub use in_memory_event_repository::InMemoryEventRepository;
pub use in_memory_storage_removal_queue::InMemoryStorageRemovalQueue;
pub use in_memory_user_directory::InMemoryUserDirectory;
pub use platform_config::{
    ChallengePhase, ChallengeSchedule, ChallengeWindow, PlatformBackend, PlatformConfig,
    PlatformSettings,
};
pub use postgres_asset_repository::PostgresAssetRepository;
pub use postgres_event_repository::PostgresEventRepository;
pub use postgres_storage_removal_queue::PostgresStorageRemovalQueue;
pub use postgres_user_directory::PostgresUserDirectory;
