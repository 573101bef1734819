//! Error types for markr-server
//!
//! `ImportError` classifies why a batch was rejected; `ApiError` maps every
//! failure onto an HTTP response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Why an import batch was rejected
#[derive(Debug, Error)]
pub enum ImportError {
    /// Document has no `mcq-test-results` root
    #[error("\"mcq-test-results\" not found on the root node")]
    RootNotFound,

    /// A record is missing a field or has a field of the wrong type
    #[error("Invalid result provided, please validate if attributes are missing")]
    InvalidResult,

    /// The body is not well-formed XML
    #[error("Malformed XML document: {0}")]
    MalformedDocument(String),

    /// `scanned-on` could not be parsed as a timestamp
    #[error("Invalid scanned-on timestamp: {0}")]
    InvalidTimestamp(String),

    /// Persistence failure while merging a record
    #[error(transparent)]
    Store(#[from] markr_common::Error),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected input (400)
    #[error("{0}")]
    BadRequest(String),

    /// Body is not `text/xml+markr` (406)
    #[error("Only 'text/xml+markr' content types supported.")]
    NotAcceptable,

    /// Unknown route or resource (404)
    #[error("Page not found")]
    NotFound,

    /// Persistence failure (500)
    #[error(transparent)]
    Common(#[from] markr_common::Error),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Store(e) => ApiError::Common(e),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::NotAcceptable => {
                (StatusCode::NOT_ACCEPTABLE, self.to_string()).into_response()
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            ApiError::Common(ref err) => {
                tracing::error!(error = %err, "Request failed");
                let name = match err {
                    markr_common::Error::Database(_) => "DatabaseError",
                    markr_common::Error::Io(_) => "IoError",
                    markr_common::Error::Config(_) => "ConfigError",
                };
                let body = Json(json!({
                    "name": name,
                    "message": err.to_string(),
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
