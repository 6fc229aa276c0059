mod assets;
mod common;
mod events;
mod platform;

pub use assets::{
    AssetDetailResponse, AssetDownloadResponse, AssetListParams, AssetPageResponse,
    MutationOutcomeResponse, RenameAssetRequest, UpdateAssetRequest,
};
pub use common::HealthResponse;
pub use events::{EventListParams, EventResponse};
pub use platform::PlatformConfigResponse;
