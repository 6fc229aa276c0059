use genoshare_application::EventQuery;
use genoshare_core::AppResult;
use genoshare_domain::{Event, EventKind, EventPayload};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

const DEFAULT_EVENT_LIMIT: usize = 50;

/// Query string of the event log endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListParams {
    pub kind: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl EventListParams {
    pub fn into_query(self) -> AppResult<EventQuery> {
        let kind = self
            .kind
            .filter(|kind| !kind.trim().is_empty())
            .map(|kind| kind.trim().parse::<EventKind>())
            .transpose()?;

        Ok(EventQuery {
            kind,
            limit: self.limit.unwrap_or(DEFAULT_EVENT_LIMIT),
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// API representation of a logged event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/event-response.ts"
)]
pub struct EventResponse {
    pub id: String,
    pub kind: String,
    pub occurred_at: String,
    pub dxuser: String,
    pub org_handle: Option<String>,
    pub dxid: Option<String>,
    #[ts(type = "number | null")]
    pub file_size: Option<i64>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        let (dxid, file_size) = match event.payload() {
            EventPayload::FileDownloaded { file_size, dxid } => (Some(dxid.clone()), Some(*file_size)),
        };

        Self {
            id: event.id().to_string(),
            kind: event.kind().as_str().to_owned(),
            occurred_at: event.occurred_at().to_rfc3339(),
            dxuser: event.dxuser().to_owned(),
            org_handle: event.org_handle().map(ToOwned::to_owned),
            dxid,
            file_size,
        }
    }
}
