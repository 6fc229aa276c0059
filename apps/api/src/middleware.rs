use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use genoshare_core::{AppError, RequestContext};
use tower_sessions::Session;

use crate::auth::{SESSION_USER_KEY, SessionUser};
use crate::error::ApiResult;
use crate::state::AppState;

/// Attaches the caller's [`RequestContext`]; missing sessions become guests.
pub async fn resolve_request_context(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let session_user = session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session user: {error}")))?;

    let context = request_context_for(&state, session_user);
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

pub(crate) fn request_context_for(
    state: &AppState,
    session_user: Option<SessionUser>,
) -> RequestContext {
    match session_user {
        Some(SessionUser {
            user,
            platform_token,
        }) => {
            let is_admin = state.admin_dxusers.contains(user.dxuser());
            RequestContext::authenticated(user, is_admin, platform_token)
        }
        None => RequestContext::guest(),
    }
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site") {
            if fetch_site == HeaderValue::from_static("cross-site") {
                return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url.as_str();
        if origin != allowed_origin && !referer.starts_with(allowed_origin) {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
