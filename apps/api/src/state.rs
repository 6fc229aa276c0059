use std::collections::HashSet;
use std::sync::Arc;

use genoshare_application::{AssetService, EventService, UserDirectory};
use genoshare_infrastructure::PlatformConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub asset_service: AssetService,
    pub event_service: EventService,
    pub user_directory: Arc<dyn UserDirectory>,
    pub platform_config: Arc<PlatformConfig>,
    pub admin_dxusers: Arc<HashSet<String>>,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
