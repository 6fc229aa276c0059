use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use genoshare_core::{AppError, ContextUser};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "session_user";

/// Signed-in user as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user: ContextUser,
    pub platform_token: Option<String>,
}

/// Operator sign-in; the platform OAuth exchange happens elsewhere and
/// hands over the resulting access token here.
#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub dxuser: String,
    pub token: String,
    #[serde(default)]
    pub platform_token: Option<String>,
}

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let user = state
        .user_directory
        .find_user_by_dxuser(payload.dxuser.trim())
        .await?
        .ok_or_else(|| {
            AppError::Unauthorized(format!("unknown platform user '{}'", payload.dxuser))
        })?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    let dxuser = user.dxuser().to_owned();
    session
        .insert(
            SESSION_USER_KEY,
            SessionUser {
                user,
                platform_token: payload
                    .platform_token
                    .filter(|token| !token.trim().is_empty()),
            },
        )
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session user: {error}")))?;

    info!(dxuser = %dxuser, "session bootstrapped");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}
