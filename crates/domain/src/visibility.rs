//! Visibility predicates for shared resources.
//!
//! Listings compile these predicates into storage filters; every returned
//! row and every mutation is re-checked against the functions below.

use genoshare_core::{RequestContext, UserId};

use crate::{AccessGrantLevel, Asset, AssetListing, AssetScope};

/// Resource with an owner and a visibility scope.
pub trait ShareableResource {
    /// Returns the owning user.
    fn owner_user_id(&self) -> UserId;

    /// Returns the visibility scope.
    fn scope(&self) -> AssetScope;
}

impl ShareableResource for Asset {
    fn owner_user_id(&self) -> UserId {
        Asset::owner_user_id(self)
    }

    fn scope(&self) -> AssetScope {
        Asset::scope(self)
    }
}

impl ShareableResource for AssetListing {
    fn owner_user_id(&self) -> UserId {
        self.asset().owner_user_id()
    }

    fn scope(&self) -> AssetScope {
        self.asset().scope()
    }
}

/// Returns whether the caller created the resource.
#[must_use]
pub fn is_owner(context: &RequestContext, resource: &impl ShareableResource) -> bool {
    context
        .user_id()
        .is_some_and(|user_id| user_id == resource.owner_user_id())
}

/// Returns whether the caller may modify the resource.
///
/// `grant` is the caller's explicit share on the resource, if any.
#[must_use]
pub fn is_editable(
    context: &RequestContext,
    resource: &impl ShareableResource,
    grant: Option<AccessGrantLevel>,
) -> bool {
    if context.is_guest() {
        return false;
    }

    context.is_admin()
        || is_owner(context, resource)
        || grant == Some(AccessGrantLevel::Edit)
}

/// Returns whether the caller may read the resource.
#[must_use]
pub fn is_readable(
    context: &RequestContext,
    resource: &impl ShareableResource,
    grant: Option<AccessGrantLevel>,
) -> bool {
    is_editable(context, resource, grant)
        || is_publicly_readable(resource)
        || (!context.is_guest() && grant.is_some())
}

/// Returns whether anyone, including guests, may read the resource.
#[must_use]
pub fn is_publicly_readable(resource: &impl ShareableResource) -> bool {
    resource.scope() == AssetScope::Public
}

/// Named predicate a listing is evaluated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityFilter {
    /// Rows the caller may edit.
    Editable,
    /// Rows the caller may read.
    Accessible,
    /// Public rows, independent of the caller.
    Public,
}

impl VisibilityFilter {
    /// Returns a stable value used by storage adapters.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editable => "editable",
            Self::Accessible => "accessible",
            Self::Public => "public",
        }
    }

    /// Evaluates the predicate for one resource.
    #[must_use]
    pub fn allows(
        &self,
        context: &RequestContext,
        resource: &impl ShareableResource,
        grant: Option<AccessGrantLevel>,
    ) -> bool {
        match self {
            Self::Editable => is_editable(context, resource, grant),
            Self::Accessible => is_readable(context, resource, grant),
            Self::Public => is_publicly_readable(resource),
        }
    }
}
