use genoshare_application::{AssetDownload, RenameAssetInput, UpdateAssetInput};
use genoshare_core::AppResult;
use genoshare_domain::{
    AssetFilter, AssetListing, AssetSort, AssetSortKey, Page, PageRequest, SortDirection,
};

use super::types::{
    AssetDetailResponse, AssetDownloadResponse, AssetLicenseResponse, AssetListParams,
    AssetOrganizationResponse, AssetOwnerResponse, AssetPageResponse, AssetResponse,
    MutationOutcome, MutationOutcomeResponse, RenameAssetRequest, UpdateAssetRequest,
};

impl AssetListParams {
    /// Splits the query string into a filter and a validated page request.
    pub fn into_query(self) -> AppResult<(AssetFilter, PageRequest)> {
        let key = match non_blank(self.order) {
            Some(order) => order.parse::<AssetSortKey>()?,
            None => AssetSortKey::default(),
        };
        let direction = match non_blank(self.order_direction) {
            Some(direction) => direction.to_ascii_lowercase().parse::<SortDirection>()?,
            None => SortDirection::default(),
        };
        let page = PageRequest::new(self.page.unwrap_or(1), AssetSort { key, direction })?;

        let filter = AssetFilter {
            name_contains: non_blank(self.name),
            tag: non_blank(self.tag),
            organization_id: None,
        };

        Ok((filter, page))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

impl From<&AssetListing> for AssetResponse {
    fn from(listing: &AssetListing) -> Self {
        let asset = listing.asset();
        Self {
            dxid: asset.dxid().to_owned(),
            name: asset.name().as_str().to_owned(),
            title: asset.name().prefix().to_owned(),
            description: asset.description().map(ToOwned::to_owned),
            scope: asset.scope().as_str().to_owned(),
            state: asset.state().as_str().to_owned(),
            file_size: asset.file_size(),
            has_license: asset.license().is_some(),
            owner: AssetOwnerResponse {
                dxuser: listing.owner().dxuser().to_owned(),
                display_name: listing.owner().display_name().to_owned(),
            },
            organization: listing
                .organization()
                .map(|organization| AssetOrganizationResponse {
                    handle: organization.handle().to_owned(),
                    name: organization.name().to_owned(),
                }),
            tags: listing
                .tags()
                .iter()
                .map(|tag| tag.name().to_owned())
                .collect(),
            created_at: asset.created_at().to_rfc3339(),
            updated_at: asset.updated_at().to_rfc3339(),
        }
    }
}

impl From<AssetListing> for AssetDetailResponse {
    fn from(listing: AssetListing) -> Self {
        let license = listing.asset().license().map(|license| AssetLicenseResponse {
            uid: license.uid().as_str().to_owned(),
            title: license.title().as_str().to_owned(),
            content: license.content().to_owned(),
        });

        Self {
            asset: AssetResponse::from(&listing),
            license,
        }
    }
}

impl From<Page<AssetListing>> for AssetPageResponse {
    fn from(page: Page<AssetListing>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items.iter().map(AssetResponse::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            total_pages,
        }
    }
}

impl From<AssetDownload> for AssetDownloadResponse {
    fn from(download: AssetDownload) -> Self {
        Self {
            dxid: download.asset.dxid().to_owned(),
            name: download.asset.name().as_str().to_owned(),
            url: download.url,
        }
    }
}

impl From<RenameAssetRequest> for RenameAssetInput {
    fn from(request: RenameAssetRequest) -> Self {
        Self {
            title: request.title.as_str().map(ToOwned::to_owned),
        }
    }
}

impl From<UpdateAssetRequest> for UpdateAssetInput {
    fn from(request: UpdateAssetRequest) -> Self {
        Self {
            description: request.description,
            title: request.title,
        }
    }
}

impl MutationOutcomeResponse {
    #[must_use]
    pub fn success(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self {
            outcome: MutationOutcome::Success,
            message: message.into(),
            redirect_to: redirect_to.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self {
            outcome: MutationOutcome::Error,
            message: message.into(),
            redirect_to: redirect_to.into(),
        }
    }
}
