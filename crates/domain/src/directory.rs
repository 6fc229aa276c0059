use genoshare_core::{AppResult, NonEmptyString, OrganizationId, UserId};
use serde::{Deserialize, Serialize};

/// Organization that groups platform users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    id: OrganizationId,
    handle: NonEmptyString,
    name: NonEmptyString,
}

impl Organization {
    /// Creates a validated organization.
    pub fn new(
        id: OrganizationId,
        handle: impl Into<String>,
        name: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            handle: NonEmptyString::new(handle)?,
            name: NonEmptyString::new(name)?,
        })
    }

    /// Returns the organization id.
    #[must_use]
    pub fn id(&self) -> OrganizationId {
        self.id
    }

    /// Returns the stable organization handle.
    #[must_use]
    pub fn handle(&self) -> &str {
        self.handle.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// Public projection of a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    id: UserId,
    dxuser: NonEmptyString,
    full_name: String,
}

impl UserSummary {
    /// Creates a validated user summary.
    pub fn new(id: UserId, dxuser: impl Into<String>, full_name: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            id,
            dxuser: NonEmptyString::new(dxuser)?,
            full_name: full_name.into().trim().to_owned(),
        })
    }

    /// Returns the user id.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the platform username.
    #[must_use]
    pub fn dxuser(&self) -> &str {
        self.dxuser.as_str()
    }

    /// Returns the display name, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            self.dxuser.as_str()
        } else {
            self.full_name.as_str()
        }
    }
}
