use async_trait::async_trait;
use genoshare_application::{PendingStorageRemoval, StorageRemovalQueue, StorageRemovalRequest};
use genoshare_core::AppResult;
use tokio::sync::RwLock;
use uuid::Uuid;

const DEFAULT_MAX_ATTEMPTS: i32 = 12;

#[derive(Debug, Clone)]
struct QueuedRemoval {
    removal: PendingStorageRemoval,
    claimed: bool,
    last_error: String,
}

/// In-memory retry queue without backoff; failed rows are due immediately.
#[derive(Debug, Default)]
pub struct InMemoryStorageRemovalQueue {
    rows: RwLock<Vec<QueuedRemoval>>,
}

impl InMemoryStorageRemovalQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows that still await removal.
    pub async fn pending_count(&self) -> usize {
        self.rows
            .read()
            .await
            .iter()
            .filter(|row| row.removal.attempt_count < row.removal.max_attempts)
            .count()
    }
}

#[async_trait]
impl StorageRemovalQueue for InMemoryStorageRemovalQueue {
    async fn enqueue(&self, request: StorageRemovalRequest) -> AppResult<()> {
        self.rows.write().await.push(QueuedRemoval {
            removal: PendingStorageRemoval {
                id: Uuid::new_v4(),
                project: request.project,
                dxids: request.dxids,
                attempt_count: 0,
                max_attempts: DEFAULT_MAX_ATTEMPTS,
            },
            claimed: false,
            last_error: request.last_error,
        });
        Ok(())
    }

    async fn claim_due(&self, limit: usize) -> AppResult<Vec<PendingStorageRemoval>> {
        let mut rows = self.rows.write().await;
        Ok(rows
            .iter_mut()
            .filter(|row| !row.claimed && row.removal.attempt_count < row.removal.max_attempts)
            .take(limit)
            .map(|row| {
                row.claimed = true;
                row.removal.clone()
            })
            .collect())
    }

    async fn mark_completed(&self, id: Uuid) -> AppResult<()> {
        self.rows.write().await.retain(|row| row.removal.id != id);
        Ok(())
    }

    async fn mark_failed(&self, removal: &PendingStorageRemoval, error: &str) -> AppResult<()> {
        if let Some(row) = self
            .rows
            .write()
            .await
            .iter_mut()
            .find(|row| row.removal.id == removal.id)
        {
            row.removal.attempt_count = removal.attempt_count + 1;
            row.claimed = false;
            error.clone_into(&mut row.last_error);
        }
        Ok(())
    }
}
