use std::collections::HashMap;

use async_trait::async_trait;
use genoshare_application::UserDirectory;
use genoshare_core::{AppResult, ContextUser};
use tokio::sync::RwLock;

/// In-memory user directory keyed by platform username.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, ContextUser>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a user.
    pub async fn add_user(&self, user: ContextUser) {
        self.users
            .write()
            .await
            .insert(user.dxuser().to_owned(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user_by_dxuser(&self, dxuser: &str) -> AppResult<Option<ContextUser>> {
        Ok(self.users.read().await.get(dxuser).cloned())
    }
}
