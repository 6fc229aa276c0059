use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Query string accepted by the asset listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetListParams {
    pub order: Option<String>,
    pub order_direction: Option<String>,
    pub page: Option<u32>,
    pub name: Option<String>,
    pub tag: Option<String>,
}

/// Owner of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/asset-owner-response.ts"
)]
pub struct AssetOwnerResponse {
    pub dxuser: String,
    pub display_name: String,
}

/// Organization of an asset owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/asset-organization-response.ts"
)]
pub struct AssetOrganizationResponse {
    pub handle: String,
    pub name: String,
}

/// API representation of one listed asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/asset-response.ts"
)]
pub struct AssetResponse {
    pub dxid: String,
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub scope: String,
    pub state: String,
    #[ts(type = "number")]
    pub file_size: i64,
    pub has_license: bool,
    pub owner: AssetOwnerResponse,
    pub organization: Option<AssetOrganizationResponse>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// License text shown on the asset page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/asset-license-response.ts"
)]
pub struct AssetLicenseResponse {
    pub uid: String,
    pub title: String,
    pub content: String,
}

/// Asset page payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/asset-detail-response.ts"
)]
pub struct AssetDetailResponse {
    pub asset: AssetResponse,
    pub license: Option<AssetLicenseResponse>,
}

/// One page of assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/asset-page-response.ts"
)]
pub struct AssetPageResponse {
    pub items: Vec<AssetResponse>,
    pub page: u32,
    pub page_size: u32,
    #[ts(type = "number")]
    pub total: u64,
    #[ts(type = "number")]
    pub total_pages: u64,
}

/// Incoming payload for renaming an asset.
///
/// Any JSON value is accepted so that non-string titles reach validation.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rename-asset-request.ts"
)]
pub struct RenameAssetRequest {
    #[serde(default)]
    #[ts(type = "string")]
    pub title: serde_json::Value,
}

/// Incoming payload for updating an asset.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-asset-request.ts"
)]
pub struct UpdateAssetRequest {
    pub description: Option<String>,
    pub title: Option<String>,
}

/// Outcome of an asset mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/mutation-outcome.ts"
)]
pub enum MutationOutcome {
    Success,
    Error,
}

/// Flash-style mutation result with the page the client should show next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/mutation-outcome-response.ts"
)]
pub struct MutationOutcomeResponse {
    pub outcome: MutationOutcome,
    pub message: String,
    pub redirect_to: String,
}

/// Pre-authenticated download link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/asset-download-response.ts"
)]
pub struct AssetDownloadResponse {
    pub dxid: String,
    pub name: String,
    pub url: String,
}
