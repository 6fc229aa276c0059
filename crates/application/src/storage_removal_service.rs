use std::sync::Arc;

use genoshare_core::{AppError, AppResult};
use tracing::{info, warn};

use crate::platform_ports::{StoragePlatform, StorageRemovalQueue};

/// Counters for one worker pass over the removal queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageRemovalBatch {
    /// Rows claimed from the queue.
    pub claimed: usize,
    /// Rows whose objects were removed.
    pub completed: usize,
    /// Rows that failed again.
    pub failed: usize,
}

/// Retries platform object removals that failed inline.
#[derive(Clone)]
pub struct StorageRemovalService {
    queue: Arc<dyn StorageRemovalQueue>,
    storage_platform: Arc<dyn StoragePlatform>,
    admin_token: String,
}

impl StorageRemovalService {
    /// Creates a new removal service using the platform admin token.
    #[must_use]
    pub fn new(
        queue: Arc<dyn StorageRemovalQueue>,
        storage_platform: Arc<dyn StoragePlatform>,
        admin_token: String,
    ) -> Self {
        Self {
            queue,
            storage_platform,
            admin_token,
        }
    }

    /// Claims due removals and retries each one once.
    pub async fn process_due(&self, batch_size: usize) -> AppResult<StorageRemovalBatch> {
        if batch_size == 0 {
            return Err(AppError::Validation(
                "batch_size must be greater than zero".to_owned(),
            ));
        }

        let removals = self.queue.claim_due(batch_size).await?;
        let mut batch = StorageRemovalBatch {
            claimed: removals.len(),
            ..StorageRemovalBatch::default()
        };

        for removal in removals {
            match self
                .storage_platform
                .remove_objects(self.admin_token.as_str(), &removal.project, &removal.dxids)
                .await
            {
                Ok(()) => {
                    self.queue.mark_completed(removal.id).await?;
                    batch.completed += 1;
                    info!(removal_id = %removal.id, project = %removal.project, "queued object removal completed");
                }
                Err(error) => {
                    let message = error.to_string();
                    self.queue.mark_failed(&removal, message.as_str()).await?;
                    batch.failed += 1;
                    warn!(
                        removal_id = %removal.id,
                        attempt = removal.attempt_count + 1,
                        max_attempts = removal.max_attempts,
                        error = %message,
                        "queued object removal failed"
                    );
                }
            }
        }

        Ok(batch)
    }
}
