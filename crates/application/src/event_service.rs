use std::sync::Arc;

use chrono::Utc;
use genoshare_core::{AppError, AppResult, RequestContext};
use genoshare_domain::{Asset, Event};

use crate::event_ports::{EventQuery, EventRepository};

const MAX_EVENT_PAGE: usize = 200;

/// Records and lists domain events.
#[derive(Clone)]
pub struct EventService {
    repository: Arc<dyn EventRepository>,
}

impl EventService {
    /// Creates a new event service.
    #[must_use]
    pub fn new(repository: Arc<dyn EventRepository>) -> Self {
        Self { repository }
    }

    /// Appends a file-downloaded event for the signed-in caller.
    pub async fn record_file_downloaded(
        &self,
        context: &RequestContext,
        asset: &Asset,
    ) -> AppResult<Event> {
        let event = Event::file_downloaded(context, asset, Utc::now())?;
        self.repository.append_event(event.clone()).await?;
        Ok(event)
    }

    /// Lists recorded events, newest first. Admin only.
    pub async fn list_events(
        &self,
        context: &RequestContext,
        query: EventQuery,
    ) -> AppResult<Vec<Event>> {
        if !context.is_admin() {
            return Err(AppError::Forbidden(
                "event log is restricted to administrators".to_owned(),
            ));
        }

        self.repository
            .list_events(EventQuery {
                limit: query.limit.clamp(1, MAX_EVENT_PAGE),
                ..query
            })
            .await
    }
}
