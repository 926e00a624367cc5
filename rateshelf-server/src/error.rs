//! HTTP error mapping for rateshelf-server
//!
//! Every failure leaves the API as `{"error": ..., "details"?: ...}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rateshelf_common::models::ErrorBody;
use thiserror::Error;
use tracing::error;

use crate::services::ServiceError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    /// Translate a service failure
    ///
    /// `failure` is the operation-level message reported for infrastructure
    /// errors, with the underlying cause moved to `details`.
    pub fn from_service(err: ServiceError, failure: &str) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::BadRequest(e.to_string()),
            ServiceError::Conflict(msg) => ApiError::BadRequest(msg),
            ServiceError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ServiceError::Infrastructure(e) => {
                error!("{}: {}", failure, e);
                ApiError::Internal {
                    message: failure.to_string(),
                    details: Some(e.to_string()),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Bodies that are not JSON, or whose fields have the wrong type
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => ErrorBody {
                error: msg,
                details: None,
            },
            ApiError::Internal { message, details } => ErrorBody {
                error: message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
