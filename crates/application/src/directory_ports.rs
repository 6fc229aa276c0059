use async_trait::async_trait;
use genoshare_core::{AppResult, ContextUser};

/// Lookup of platform users for session sign-in.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user and their organization by platform username.
    async fn find_user_by_dxuser(&self, dxuser: &str) -> AppResult<Option<ContextUser>>;
}
