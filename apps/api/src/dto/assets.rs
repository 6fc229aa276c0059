mod conversions;
mod types;

pub use types::{
    AssetDetailResponse, AssetDownloadResponse, AssetLicenseResponse, AssetListParams,
    AssetOrganizationResponse, AssetOwnerResponse, AssetPageResponse, AssetResponse,
    MutationOutcome, MutationOutcomeResponse, RenameAssetRequest, UpdateAssetRequest,
};
