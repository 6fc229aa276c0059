use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use genoshare_core::AppError;
use tracing::error;

mod types;

pub use types::ErrorResponse;

/// Body shared by missing and hidden resources.
const NOT_FOUND_OR_NOT_PERMITTED: &str = "not found or not permitted";

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::Forbidden(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            // Hidden and missing resources must be indistinguishable.
            AppError::NotFound(_) | AppError::Forbidden(_) => {
                NOT_FOUND_OR_NOT_PERMITTED.to_owned()
            }
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed with an internal error");
                "internal error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
