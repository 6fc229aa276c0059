use std::str::FromStr;

use chrono::{DateTime, Utc};
use genoshare_core::{AppError, AppResult, NonEmptyString, RequestContext};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Asset;

/// Kinds of facts recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A user fetched a download link for a file or asset.
    FileDownloaded,
}

impl EventKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileDownloaded => "file_downloaded",
        }
    }
}

impl FromStr for EventKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "file_downloaded" => Ok(Self::FileDownloaded),
            _ => Err(AppError::Validation(format!("unknown event kind '{value}'"))),
        }
    }
}

/// Kind-specific event fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// Payload of [`EventKind::FileDownloaded`].
    FileDownloaded {
        /// Size of the downloaded object in bytes.
        file_size: i64,
        /// Remote object id.
        dxid: String,
    },
}

impl EventPayload {
    /// Returns the kind this payload belongs to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::FileDownloaded { .. } => EventKind::FileDownloaded,
        }
    }
}

/// Immutable, append-only fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: Uuid,
    occurred_at: DateTime<Utc>,
    dxuser: NonEmptyString,
    org_handle: Option<String>,
    payload: EventPayload,
}

impl Event {
    /// Rebuilds an event from stored parts.
    pub fn from_parts(
        id: Uuid,
        occurred_at: DateTime<Utc>,
        dxuser: impl Into<String>,
        org_handle: Option<String>,
        payload: EventPayload,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            occurred_at,
            dxuser: NonEmptyString::new(dxuser)?,
            org_handle,
            payload,
        })
    }

    /// Records that the signed-in caller downloaded an asset.
    pub fn file_downloaded(
        context: &RequestContext,
        asset: &Asset,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let user = context.user().ok_or_else(|| {
            AppError::Unauthorized("downloads require a signed-in user".to_owned())
        })?;

        Self::from_parts(
            Uuid::new_v4(),
            occurred_at,
            user.dxuser(),
            user.org_handle().map(str::to_owned),
            EventPayload::FileDownloaded {
                file_size: asset.file_size(),
                dxid: asset.dxid().to_owned(),
            },
        )
    }

    /// Returns the event id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the event kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Returns when the fact happened.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns the acting platform username.
    #[must_use]
    pub fn dxuser(&self) -> &str {
        self.dxuser.as_str()
    }

    /// Returns the acting user's organization handle.
    #[must_use]
    pub fn org_handle(&self) -> Option<&str> {
        self.org_handle.as_deref()
    }

    /// Returns the kind-specific payload.
    #[must_use]
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use genoshare_core::{AssetId, ContextUser, OrganizationId, RequestContext, UserId};

    use super::{Event, EventKind, EventPayload};
    use crate::{Asset, AssetAttributes, AssetScope, AssetState};

    fn asset() -> Asset {
        Asset::from_attributes(AssetAttributes {
            id: AssetId::new(),
            dxid: "file-F5g2fGj0458P90BP9ZbpkpvG".to_owned(),
            project: "project-F5g2fGj06B2Vy5Yx7pKPVb50".to_owned(),
            name: "hg38.tar.gz".to_owned(),
            description: None,
            owner_user_id: UserId::new(),
            owner_organization_id: None,
            scope: AssetScope::Public,
            state: AssetState::Closed,
            license: None,
            file_size: 4_194_304,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn file_downloaded_captures_actor_and_object() {
        let context = RequestContext::authenticated(
            ContextUser::new(
                UserId::new(),
                "alice.black",
                Some(OrganizationId::new()),
                Some("automationtestinggmbh".to_owned()),
            ),
            false,
            None,
        );

        let event = Event::file_downloaded(&context, &asset(), Utc::now())
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(event.kind(), EventKind::FileDownloaded);
        assert_eq!(event.dxuser(), "alice.black");
        assert_eq!(event.org_handle(), Some("automationtestinggmbh"));
        assert_eq!(
            event.payload(),
            &EventPayload::FileDownloaded {
                file_size: 4_194_304,
                dxid: "file-F5g2fGj0458P90BP9ZbpkpvG".to_owned(),
            }
        );
    }

    #[test]
    fn guests_cannot_produce_download_events() {
        let result = Event::file_downloaded(&RequestContext::guest(), &asset(), Utc::now());
        assert!(result.is_err());
    }
}
