//! HTTP error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contentflow::errors::ServiceError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by the HTTP handlers.
///
/// Every variant renders as `{"detail": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request was well-formed but unacceptable (e.g. blank input).
    #[error("{0}")]
    BadRequest(String),

    /// The body could not be decoded into the request schema.
    #[error("{0}")]
    Unprocessable(String),

    /// A pipeline stage failed.
    #[error("生成失败: {0}")]
    Generation(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::EmptyInput => Self::BadRequest(err.to_string()),
            ServiceError::Generation { message, .. } => Self::Generation(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_mapping() {
        let err = ApiError::from(ServiceError::EmptyInput);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "输入内容不能为空");

        let err = ApiError::from(ServiceError::Generation {
            stage: "refine_content".to_string(),
            message: "文案生成失败: timeout".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "生成失败: 文案生成失败: timeout");
    }

    #[test]
    fn test_unprocessable_status() {
        let err = ApiError::Unprocessable("missing field `user_input`".to_string());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
