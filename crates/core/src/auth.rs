use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

use crate::{OrganizationId, UserId};

/// Signed-in user attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextUser {
    user_id: UserId,
    dxuser: String,
    organization_id: Option<OrganizationId>,
    org_handle: Option<String>,
}

impl ContextUser {
    /// Creates a signed-in user from directory data.
    #[must_use]
    pub fn new(
        user_id: UserId,
        dxuser: impl Into<String>,
        organization_id: Option<OrganizationId>,
        org_handle: Option<String>,
    ) -> Self {
        Self {
            user_id,
            dxuser: dxuser.into(),
            organization_id,
            org_handle,
        }
    }

    /// Returns the local user id.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the platform username.
    #[must_use]
    pub fn dxuser(&self) -> &str {
        self.dxuser.as_str()
    }

    /// Returns the organization the user belongs to, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    /// Returns the organization handle, if any.
    #[must_use]
    pub fn org_handle(&self) -> Option<&str> {
        self.org_handle.as_deref()
    }
}

/// Identity of the caller for the duration of one request.
///
/// Either a guest (no user, never admin) or a signed-in user. The value is
/// built once by the request middleware and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestContext {
    user: Option<ContextUser>,
    is_admin: bool,
    platform_token: Option<String>,
}

impl RequestContext {
    /// Creates an unauthenticated guest context.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            user: None,
            is_admin: false,
            platform_token: None,
        }
    }

    /// Creates a context for a signed-in user.
    #[must_use]
    pub fn authenticated(user: ContextUser, is_admin: bool, platform_token: Option<String>) -> Self {
        Self {
            user: Some(user),
            is_admin,
            platform_token,
        }
    }

    /// Returns whether this request has no signed-in user.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.user.is_none()
    }

    /// Returns whether the signed-in user is a site administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.is_some() && self.is_admin
    }

    /// Returns the signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&ContextUser> {
        self.user.as_ref()
    }

    /// Returns the signed-in user id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(ContextUser::user_id)
    }

    /// Returns the signed-in user's organization, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.user.as_ref().and_then(ContextUser::organization_id)
    }

    /// Returns the platform username, if signed in.
    #[must_use]
    pub fn dxuser(&self) -> Option<&str> {
        self.user.as_ref().map(ContextUser::dxuser)
    }

    /// Returns the signed-in user's organization handle, if any.
    #[must_use]
    pub fn org_handle(&self) -> Option<&str> {
        self.user.as_ref().and_then(ContextUser::org_handle)
    }

    /// Returns the token used for calls to the remote platform.
    #[must_use]
    pub fn platform_token(&self) -> Option<&str> {
        self.platform_token.as_deref()
    }
}

impl Debug for RequestContext {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RequestContext")
            .field("user", &self.user)
            .field("is_admin", &self.is_admin)
            .field(
                "platform_token",
                &self.platform_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ContextUser, RequestContext};
    use crate::UserId;

    #[test]
    fn guest_has_no_identity() {
        let context = RequestContext::guest();
        assert!(context.is_guest());
        assert!(!context.is_admin());
        assert_eq!(context.user_id(), None);
        assert_eq!(context.organization_id(), None);
    }

    #[test]
    fn debug_output_redacts_platform_token() {
        let context = RequestContext::authenticated(
            ContextUser::new(UserId::new(), "alice", None, None),
            false,
            Some("secret-token".to_owned()),
        );

        let rendered = format!("{context:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
