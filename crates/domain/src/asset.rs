use std::str::FromStr;

use chrono::{DateTime, Utc};
use genoshare_core::{AppError, AppResult, AssetId, NonEmptyString, OrganizationId, UserId};
use serde::{Deserialize, Serialize};

/// Archive extensions an asset name may end with, longest first.
pub const ASSET_NAME_SUFFIXES: [&str; 2] = [".tar.gz", ".tar"];

/// Validation message for a rename title that is missing, empty or not a string.
pub const INVALID_TITLE_MESSAGE: &str = "The new name is not a valid string";

/// Visibility scope of a shared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetScope {
    /// Only the owner, administrators and explicit grantees see the resource.
    Private,
    /// Everyone, including guests, may read the resource.
    Public,
}

impl AssetScope {
    /// Returns a stable storage value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }
}

impl FromStr for AssetScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            _ => Err(AppError::Validation(format!("unknown scope '{value}'"))),
        }
    }
}

/// Remote object state mirrored from the storage platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    /// Upload in progress.
    Open,
    /// Upload finished, platform is finalizing the object.
    Closing,
    /// Object is final and immutable.
    Closed,
}

impl AssetState {
    /// Returns a stable storage value for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }

    /// Returns whether the state is terminal and never refreshed again.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl FromStr for AssetState {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "open" => Ok(Self::Open),
            "closing" => Ok(Self::Closing),
            "closed" => Ok(Self::Closed),
            _ => Err(AppError::Validation(format!("unknown asset state '{value}'"))),
        }
    }
}

/// Explicit share level granted to one user on one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessGrantLevel {
    /// Grantee may read the resource.
    Read,
    /// Grantee may read and edit the resource.
    Edit,
}

impl AccessGrantLevel {
    /// Returns a stable storage value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Edit => "edit",
        }
    }
}

impl FromStr for AccessGrantLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "edit" => Ok(Self::Edit),
            _ => Err(AppError::Validation(format!(
                "unknown access grant level '{value}'"
            ))),
        }
    }
}

/// Archive file name of an asset, always ending in `.tar` or `.tar.gz`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetName(NonEmptyString);

impl AssetName {
    /// Creates a validated asset name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value)?;
        let Some(suffix) = suffix_of(value.as_str()) else {
            return Err(AppError::Validation(format!(
                "asset name '{}' must end with '.tar' or '.tar.gz'",
                value.as_str()
            )));
        };

        if value.as_str().len() == suffix.len() {
            return Err(AppError::Validation(format!(
                "asset name '{}' must have a title before its extension",
                value.as_str()
            )));
        }

        Ok(Self(value))
    }

    /// Returns the full file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the archive extension of the name.
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        suffix_of(self.0.as_str()).unwrap_or(".tar")
    }

    /// Returns the name without its archive extension.
    #[must_use]
    pub fn prefix(&self) -> &str {
        let name = self.0.as_str();
        &name[..name.len() - self.suffix().len()]
    }

    /// Derives a new name from a user-supplied title, keeping the extension.
    pub fn with_title(&self, title: &str) -> AppResult<Self> {
        if title.is_empty() {
            return Err(AppError::Validation(INVALID_TITLE_MESSAGE.to_owned()));
        }

        Self::new(format!("{title}{}", self.suffix()))
    }
}

fn suffix_of(name: &str) -> Option<&'static str> {
    ASSET_NAME_SUFFIXES
        .into_iter()
        .find(|suffix| name.ends_with(suffix))
}

/// License attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRef {
    uid: NonEmptyString,
    title: NonEmptyString,
    content: String,
}

impl LicenseRef {
    /// Creates a validated license reference.
    pub fn new(
        uid: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            uid: NonEmptyString::new(uid)?,
            title: NonEmptyString::new(title)?,
            content: content.into(),
        })
    }

    /// Returns the stable license uid.
    #[must_use]
    pub fn uid(&self) -> &NonEmptyString {
        &self.uid
    }

    /// Returns the license title.
    #[must_use]
    pub fn title(&self) -> &NonEmptyString {
        &self.title
    }

    /// Returns the license text.
    #[must_use]
    pub fn content(&self) -> &str {
        self.content.as_str()
    }
}

/// Free-form label attached to resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag(NonEmptyString);

impl Tag {
    /// Creates a validated tag.
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(name)?))
    }

    /// Returns the tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.as_str()
    }
}

/// Raw attributes used to build an [`Asset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAttributes {
    /// Local row id.
    pub id: AssetId,
    /// Remote file object id (`file-...`).
    pub dxid: String,
    /// Remote project holding the object (`project-...`).
    pub project: String,
    /// Archive file name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creating user.
    pub owner_user_id: UserId,
    /// Owner's organization at creation time.
    pub owner_organization_id: Option<OrganizationId>,
    /// Visibility scope.
    pub scope: AssetScope,
    /// Mirrored remote state.
    pub state: AssetState,
    /// Optional license.
    pub license: Option<LicenseRef>,
    /// Archive size in bytes.
    pub file_size: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last local modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// User-owned archive of files that apps can depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    id: AssetId,
    dxid: NonEmptyString,
    project: NonEmptyString,
    name: AssetName,
    description: Option<String>,
    owner_user_id: UserId,
    owner_organization_id: Option<OrganizationId>,
    scope: AssetScope,
    state: AssetState,
    license: Option<LicenseRef>,
    file_size: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Asset {
    /// Creates a validated asset from raw attributes.
    pub fn from_attributes(attributes: AssetAttributes) -> AppResult<Self> {
        if !attributes.dxid.starts_with("file-") {
            return Err(AppError::Validation(format!(
                "asset dxid '{}' must reference a platform file object",
                attributes.dxid
            )));
        }

        if attributes.file_size < 0 {
            return Err(AppError::Validation(
                "file_size must be greater than or equal to zero".to_owned(),
            ));
        }

        Ok(Self {
            id: attributes.id,
            dxid: NonEmptyString::new(attributes.dxid)?,
            project: NonEmptyString::new(attributes.project)?,
            name: AssetName::new(attributes.name)?,
            description: normalize_description(attributes.description),
            owner_user_id: attributes.owner_user_id,
            owner_organization_id: attributes.owner_organization_id,
            scope: attributes.scope,
            state: attributes.state,
            license: attributes.license,
            file_size: attributes.file_size,
            created_at: attributes.created_at,
            updated_at: attributes.updated_at,
        })
    }

    /// Returns the local row id.
    #[must_use]
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Returns the remote file object id.
    #[must_use]
    pub fn dxid(&self) -> &str {
        self.dxid.as_str()
    }

    /// Returns the remote project id.
    #[must_use]
    pub fn project(&self) -> &str {
        self.project.as_str()
    }

    /// Returns the archive name.
    #[must_use]
    pub fn name(&self) -> &AssetName {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the owning user.
    #[must_use]
    pub fn owner_user_id(&self) -> UserId {
        self.owner_user_id
    }

    /// Returns the owner's organization.
    #[must_use]
    pub fn owner_organization_id(&self) -> Option<OrganizationId> {
        self.owner_organization_id
    }

    /// Returns the visibility scope.
    #[must_use]
    pub fn scope(&self) -> AssetScope {
        self.scope
    }

    /// Returns the mirrored remote state.
    #[must_use]
    pub fn state(&self) -> AssetState {
        self.state
    }

    /// Returns the attached license, if any.
    #[must_use]
    pub fn license(&self) -> Option<&LicenseRef> {
        self.license.as_ref()
    }

    /// Returns the archive size in bytes.
    #[must_use]
    pub fn file_size(&self) -> i64 {
        self.file_size
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last local modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the archive name.
    pub fn rename(&mut self, name: AssetName, now: DateTime<Utc>) {
        self.name = name;
        self.updated_at = now;
    }

    /// Replaces the description; blank values clear it.
    pub fn describe(&mut self, description: Option<String>, now: DateTime<Utc>) {
        self.description = normalize_description(description);
        self.updated_at = now;
    }

    /// Applies a state refreshed from the platform. Closed assets keep their state.
    pub fn refresh_state(&mut self, state: AssetState) -> bool {
        if self.state.is_closed() || self.state == state {
            return false;
        }

        self.state = state;
        true
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
