use async_trait::async_trait;
use genoshare_core::{AppResult, RequestContext};
use genoshare_domain::{Asset, AssetState};
use uuid::Uuid;

/// Remote state of one platform object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObjectState {
    /// Remote object id.
    pub dxid: String,
    /// Remote state.
    pub state: AssetState,
}

/// Remote compute/storage platform.
#[async_trait]
pub trait StoragePlatform: Send + Sync {
    /// Removes objects from a project.
    async fn remove_objects(&self, token: &str, project: &str, dxids: &[String]) -> AppResult<()>;

    /// Describes the current state of objects.
    async fn describe_object_states(
        &self,
        token: &str,
        dxids: &[String],
    ) -> AppResult<Vec<RemoteObjectState>>;

    /// Returns a short-lived pre-authenticated download URL.
    async fn download_url(&self, token: &str, project: &str, dxid: &str) -> AppResult<String>;
}

/// Reconciles local asset state against the platform.
#[async_trait]
pub trait AssetStateSync: Send + Sync {
    /// Refreshes every non-closed asset owned by the caller.
    async fn sync_assets(&self, context: &RequestContext) -> AppResult<()>;

    /// Refreshes one asset.
    async fn sync_asset(&self, context: &RequestContext, asset: &Asset) -> AppResult<()>;
}

/// Object removal that must be retried out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRemovalRequest {
    /// Project holding the objects.
    pub project: String,
    /// Objects to remove.
    pub dxids: Vec<String>,
    /// Error of the failed inline attempt.
    pub last_error: String,
}

/// Removal claimed from the retry queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStorageRemoval {
    /// Queue row id.
    pub id: Uuid,
    /// Project holding the objects.
    pub project: String,
    /// Objects to remove.
    pub dxids: Vec<String>,
    /// Attempts made so far by the worker.
    pub attempt_count: i32,
    /// Attempts after which the row stays failed.
    pub max_attempts: i32,
}

/// Durable retry queue for storage removals.
#[async_trait]
pub trait StorageRemovalQueue: Send + Sync {
    /// Enqueues a removal for retry.
    async fn enqueue(&self, request: StorageRemovalRequest) -> AppResult<()>;

    /// Claims removals that are due for another attempt.
    async fn claim_due(&self, limit: usize) -> AppResult<Vec<PendingStorageRemoval>>;

    /// Removes a completed row from the queue.
    async fn mark_completed(&self, id: Uuid) -> AppResult<()>;

    /// Records a failed attempt and schedules the next one.
    async fn mark_failed(&self, removal: &PendingStorageRemoval, error: &str) -> AppResult<()>;
}
