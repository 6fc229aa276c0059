use async_trait::async_trait;
use genoshare_core::AppResult;
use genoshare_domain::{Event, EventKind};

/// Read query over the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Restricts to one kind.
    pub kind: Option<EventKind>,
    /// Maximum rows, clamped by the service.
    pub limit: usize,
    /// Rows to skip.
    pub offset: usize,
}

/// Append-only event store.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Appends one event.
    async fn append_event(&self, event: Event) -> AppResult<()>;

    /// Lists events, newest first.
    async fn list_events(&self, query: EventQuery) -> AppResult<Vec<Event>>;
}
