use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use invsys_auth::{AccessError, LoginError, PasswordError, Permission};
use invsys_infra::RoleAdminError;

/// Body for every 401; the reason is only logged.
pub const UNAUTHENTICATED_MESSAGE: &str = "authentication required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Unauthenticated,
    /// Carries the permission that was required.
    Forbidden(Permission),
    InvalidCredentials,
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Unauthenticated => json_error(status, "unauthenticated", UNAUTHENTICATED_MESSAGE),
            ApiError::Forbidden(permission) => json_error(
                status,
                "forbidden",
                format!("missing permission '{permission}'"),
            ),
            ApiError::InvalidCredentials => {
                json_error(status, "invalid_credentials", "invalid username or password")
            }
            ApiError::BadRequest(msg) => json_error(status, "bad_request", msg),
            ApiError::NotFound(msg) => json_error(status, "not_found", msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                json_error(status, "internal_error", "internal server error")
            }
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated(_) => ApiError::Unauthenticated,
            AccessError::Forbidden(permission) => ApiError::Forbidden(permission),
            AccessError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials => ApiError::InvalidCredentials,
            LoginError::Password(e @ (PasswordError::WeakInput { .. } | PasswordError::TooLong { .. })) => {
                ApiError::BadRequest(e.to_string())
            }
            LoginError::UserNotFound => ApiError::NotFound("user not found".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<RoleAdminError> for ApiError {
    fn from(err: RoleAdminError) -> Self {
        match err {
            e @ RoleAdminError::UnknownPermission(_) => ApiError::BadRequest(e.to_string()),
            RoleAdminError::RoleNotFound => ApiError::NotFound("role not found".to_string()),
            e @ RoleAdminError::Store(_) => ApiError::Internal(e.to_string()),
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
