use std::sync::Arc;
use std::time::Duration;

use genoshare_application::{
    AssetService, AssetServiceSettings, AssetSyncService, EventService, UserDirectory,
};
use genoshare_core::AppError;
use genoshare_infrastructure::{
    DnanexusPlatformClient, PostgresAssetRepository, PostgresEventRepository,
    PostgresStorageRemovalQueue, PostgresUserDirectory,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

const PLATFORM_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let http_client = reqwest::Client::builder()
        .timeout(PLATFORM_REQUEST_TIMEOUT)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let storage_platform = Arc::new(DnanexusPlatformClient::new(
        http_client,
        config.platform.api_server_uri.clone(),
    ));

    let asset_repository = Arc::new(PostgresAssetRepository::new(pool.clone()));
    let event_service = EventService::new(Arc::new(PostgresEventRepository::new(pool.clone())));
    let user_directory: Arc<dyn UserDirectory> =
        Arc::new(PostgresUserDirectory::new(pool.clone()));

    let asset_service = AssetService::new(
        asset_repository.clone(),
        Arc::new(AssetSyncService::new(
            asset_repository,
            storage_platform.clone(),
        )),
        storage_platform,
        Arc::new(PostgresStorageRemovalQueue::new(pool)),
        event_service.clone(),
        AssetServiceSettings {
            featured_organization_handle: config.featured_org_handle.clone(),
            platform_admin_token: config.platform_admin_token.clone(),
        },
    );

    Ok(AppState {
        asset_service,
        event_service,
        user_directory,
        platform_config: Arc::new(config.platform.clone()),
        admin_dxusers: Arc::new(config.admin_dxusers.clone()),
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
    })
}
