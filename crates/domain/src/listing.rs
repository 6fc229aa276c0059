use std::cmp::Ordering;
use std::str::FromStr;

use genoshare_core::{AppError, AppResult, OrganizationId};
use serde::{Deserialize, Serialize};

use crate::{Asset, Organization, Tag, UserSummary};

/// Fixed number of rows returned per listing page.
pub const ASSET_PAGE_SIZE: u32 = 100;

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Returns the transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(AppError::Validation(format!(
                "unknown sort direction '{value}'"
            ))),
        }
    }
}

/// Columns listings may be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSortKey {
    /// Archive file name.
    #[default]
    Name,
}

impl AssetSortKey {
    /// Returns the transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
        }
    }
}

impl FromStr for AssetSortKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            _ => Err(AppError::Validation(format!(
                "assets cannot be ordered by '{value}'"
            ))),
        }
    }
}

/// Ordering applied to a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetSort {
    /// Sort column.
    pub key: AssetSortKey,
    /// Sort direction.
    pub direction: SortDirection,
}

impl AssetSort {
    /// Compares two listings; ties fall back to the remote object id.
    #[must_use]
    pub fn compare(&self, left: &AssetListing, right: &AssetListing) -> Ordering {
        let ordering = match self.key {
            AssetSortKey::Name => left
                .asset()
                .name()
                .as_str()
                .cmp(right.asset().name().as_str()),
        };
        let ordering = match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };

        ordering.then_with(|| left.asset().dxid().cmp(right.asset().dxid()))
    }
}

/// One-based page selection with ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    sort: AssetSort,
}

impl PageRequest {
    /// Creates a validated page request.
    pub fn new(page: u32, sort: AssetSort) -> AppResult<Self> {
        if page == 0 {
            return Err(AppError::Validation(
                "page must be greater than or equal to one".to_owned(),
            ));
        }

        Ok(Self { page, sort })
    }

    /// Returns the first page with the default ordering.
    #[must_use]
    pub fn first() -> Self {
        Self {
            page: 1,
            sort: AssetSort::default(),
        }
    }

    /// Returns the one-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the ordering.
    #[must_use]
    pub fn sort(&self) -> AssetSort {
        self.sort
    }

    /// Returns the number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(ASSET_PAGE_SIZE)
    }

    /// Returns the page size.
    #[must_use]
    pub fn limit(&self) -> u32 {
        ASSET_PAGE_SIZE
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Fixed page size.
    pub page_size: u32,
    /// Total rows matching the listing.
    pub total: u64,
}

impl<T> Page<T> {
    /// Creates an empty page for a request.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            page: request.page(),
            page_size: request.limit(),
            total: 0,
        }
    }

    /// Returns the number of pages needed for all rows.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size.max(1)))
    }

    /// Transforms every row, keeping paging data.
    pub fn map<U>(self, transform: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(transform).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}

/// Optional narrowing applied on top of a visibility predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    /// Case-insensitive substring of the archive name.
    pub name_contains: Option<String>,
    /// Exact tag name.
    pub tag: Option<String>,
    /// Organization the owner currently belongs to.
    pub organization_id: Option<OrganizationId>,
}

impl AssetFilter {
    /// Returns a copy restricted to one organization.
    #[must_use]
    pub fn within_organization(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    /// Returns whether a listing row satisfies the filter.
    #[must_use]
    pub fn matches(&self, listing: &AssetListing) -> bool {
        if let Some(organization_id) = self.organization_id
            && listing.organization().map(Organization::id) != Some(organization_id)
        {
            return false;
        }

        if let Some(needle) = self.name_contains.as_deref().map(str::to_lowercase)
            && !listing
                .asset()
                .name()
                .as_str()
                .to_lowercase()
                .contains(needle.as_str())
        {
            return false;
        }

        if let Some(tag) = self.tag.as_deref()
            && !listing.tags().iter().any(|value| value.name() == tag)
        {
            return false;
        }

        true
    }
}

/// Asset row with the associations every listing renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetListing {
    asset: Asset,
    owner: UserSummary,
    organization: Option<Organization>,
    tags: Vec<Tag>,
}

impl AssetListing {
    /// Creates a listing row; tags are stored sorted.
    #[must_use]
    pub fn new(
        asset: Asset,
        owner: UserSummary,
        organization: Option<Organization>,
        mut tags: Vec<Tag>,
    ) -> Self {
        tags.sort();
        tags.dedup();
        Self {
            asset,
            owner,
            organization,
            tags,
        }
    }

    /// Returns the asset.
    #[must_use]
    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    /// Returns the owner.
    #[must_use]
    pub fn owner(&self) -> &UserSummary {
        &self.owner
    }

    /// Returns the owner's organization.
    #[must_use]
    pub fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    /// Returns the attached tags.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Consumes the row and returns the asset.
    #[must_use]
    pub fn into_asset(self) -> Asset {
        self.asset
    }
}
