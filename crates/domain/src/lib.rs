//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod asset;
mod directory;
mod event;
mod listing;
mod visibility;

pub use asset::{
    ASSET_NAME_SUFFIXES, AccessGrantLevel, Asset, AssetAttributes, AssetName, AssetScope,
    AssetState, INVALID_TITLE_MESSAGE, LicenseRef, Tag,
};
pub use directory::{Organization, UserSummary};
pub use event::{Event, EventKind, EventPayload};
pub use listing::{
    ASSET_PAGE_SIZE, AssetFilter, AssetListing, AssetSort, AssetSortKey, Page, PageRequest,
    SortDirection,
};
pub use visibility::{
    ShareableResource, VisibilityFilter, is_editable, is_owner, is_publicly_readable,
    is_readable,
};
