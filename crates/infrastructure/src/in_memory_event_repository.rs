use async_trait::async_trait;
use genoshare_application::{EventQuery, EventRepository};
use genoshare_core::AppResult;
use genoshare_domain::Event;
use tokio::sync::RwLock;

/// In-memory append-only event log.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: RwLock<Vec<Event>>,
}

impl InMemoryEventRepository {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn append_event(&self, event: Event) -> AppResult<()> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn list_events(&self, query: EventQuery) -> AppResult<Vec<Event>> {
        let events = self.events.read().await;
        let mut matching: Vec<Event> = events
            .iter()
            .filter(|event| query.kind.is_none_or(|kind| event.kind() == kind))
            .cloned()
            .collect();
        matching.sort_by(|left, right| {
            right
                .occurred_at()
                .cmp(&left.occurred_at())
                .then_with(|| right.id().cmp(&left.id()))
        });

        Ok(matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use genoshare_application::{EventQuery, EventRepository};
    use genoshare_domain::{Event, EventPayload};
    use uuid::Uuid;

    use super::InMemoryEventRepository;

    fn event(minutes_ago: i64, dxid: &str) -> Event {
        Event::from_parts(
            Uuid::new_v4(),
            Utc::now() - Duration::minutes(minutes_ago),
            "alice",
            None,
            EventPayload::FileDownloaded {
                file_size: 1,
                dxid: dxid.to_owned(),
            },
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn list_events_returns_newest_first() {
        let repository = InMemoryEventRepository::new();
        for (minutes_ago, dxid) in [(10, "file-old"), (1, "file-new"), (5, "file-mid")] {
            assert!(repository.append_event(event(minutes_ago, dxid)).await.is_ok());
        }

        let events = repository
            .list_events(EventQuery {
                kind: None,
                limit: 2,
                offset: 0,
            })
            .await
            .unwrap_or_else(|_| unreachable!());

        let dxids: Vec<&str> = events
            .iter()
            .map(|event| match event.payload() {
                EventPayload::FileDownloaded { dxid, .. } => dxid.as_str(),
            })
            .collect();
        assert_eq!(dxids, vec!["file-new", "file-mid"]);
    }
}
