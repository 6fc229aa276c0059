use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::dto::PlatformConfigResponse;
use crate::state::AppState;

pub async fn platform_config_handler(State(state): State<AppState>) -> Json<PlatformConfigResponse> {
    Json(PlatformConfigResponse::from_config(
        &state.platform_config,
        Utc::now(),
    ))
}
