//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const CANCELLED: i32 = 499;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    Conflict(String),
    Cancelled(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
            ApiError::Conflict(_) => errno::CONFLICT,
            ApiError::Cancelled(_) => errno::CANCELLED,
            ApiError::ServiceUnavailable(_) => errno::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.errno();
        let msg = match self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = code, error = %msg, "Resource not found");
                msg
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = code, error = %msg, "Bad request");
                msg
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = code, error = %msg, "Internal server error");
                msg
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(errno = code, error = %msg, "Resource conflict");
                msg
            }
            ApiError::Cancelled(msg) => {
                tracing::info!(errno = code, error = %msg, "Request cancelled");
                msg
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = code, error = %msg, "Service unavailable");
                msg
            }
        };

        (StatusCode::OK, Json(ErrorResponse::new(code, msg))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        let msg = e.to_string();
        match e {
            ApplicationError::NotFound { .. } => ApiError::NotFound(msg),
            ApplicationError::InvalidInput(_) => ApiError::BadRequest(msg),
            ApplicationError::Conflict(_) => ApiError::Conflict(msg),
            ApplicationError::LockTimeout(_) => ApiError::ServiceUnavailable(msg),
            ApplicationError::SynthesisFailure { .. } => ApiError::ServiceUnavailable(msg),
            ApplicationError::ExternalService(_) => ApiError::ServiceUnavailable(msg),
            ApplicationError::Cancelled => ApiError::Cancelled(msg),
            ApplicationError::StorageFailure(_) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_error_mapping() {
        let err: ApiError = ApplicationError::not_found("Voice", "Alice").into();
        assert_eq!(err.errno(), errno::NOT_FOUND);

        let err: ApiError = ApplicationError::SynthesisFailure {
            index: 2,
            reason: "Request timeout".into(),
        }
        .into();
        assert_eq!(err.errno(), errno::SERVICE_UNAVAILABLE);
        match err {
            ApiError::ServiceUnavailable(msg) => assert!(msg.contains("segment 2")),
            other => panic!("unexpected error: {other:?}"),
        }

        let err: ApiError = ApplicationError::Cancelled.into();
        assert_eq!(err.errno(), errno::CANCELLED);
    }
}
