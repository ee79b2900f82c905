use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use drivegate_services::ResolveError;
use drivegate_services::auth::AuthError;
use drivegate_services::dao::base::DaoError;
use drivegate_services::dooray::UpstreamError;
use drivegate_services::recent::RecentError;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
    BadGateway(String),
    /// Upstream status and body forwarded as-is.
    Passthrough(StatusCode, String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "bad_gateway", msg),
            ApiError::Passthrough(status, body) => return (status, body).into_response(),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DaoError> for ApiError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            other => {
                error!(error = %other, "Storage failure");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => ApiError::Unauthorized("Token expired".to_string()),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Unauthenticated => {
                ApiError::Unauthorized("Login required".to_string())
            }
            ResolveError::NotFound => ApiError::NotFound("Api binding not found".to_string()),
            ResolveError::Forbidden => {
                ApiError::Forbidden("Api binding belongs to another user".to_string())
            }
            ResolveError::Storage(e) => e.into(),
        }
    }
}

impl From<RecentError> for ApiError {
    fn from(err: RecentError) -> Self {
        match err {
            RecentError::Storage(e) => e.into(),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        error!(step = %err.step(), error = %err, "Upstream call failed");
        ApiError::BadGateway(err.to_string())
    }
}
