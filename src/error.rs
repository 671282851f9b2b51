//! Error types for the image gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Gateway Error Enum ==
/// Unified error type for the image gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The path tail is not an absolute URL with a host
    #[error("Invalid source URL: {0}")]
    InvalidSourceUrl(String),

    /// Source scheme other than http/https
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// Explicit non-default port on the source URL
    #[error("Unsupported port: {0}")]
    UnsupportedPort(u16),

    /// Width, height or quality out of range or unparsable
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Source host rejected by the allowlist
    #[error("Domain ({0}) not allowed")]
    DomainNotAllowed(String),

    /// Backend answered with something that is not an image
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Backend unreachable, timed out or answered with a non-success status
    #[error("Backend error: {message}")]
    Backend {
        status: Option<u16>,
        message: String,
    },

    /// Cache write or read failure
    #[error("Cache store failure: {0}")]
    Store(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status surfaced to the caller for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidSourceUrl(_)
            | GatewayError::UnsupportedProtocol(_)
            | GatewayError::UnsupportedPort(_)
            | GatewayError::InvalidParameters(_) => StatusCode::BAD_REQUEST,
            GatewayError::DomainNotAllowed(_) => StatusCode::FORBIDDEN,
            GatewayError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            GatewayError::Backend { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Store(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the caller.
    ///
    /// Backend and store details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            GatewayError::Backend { .. } => "Error resizing image".to_string(),
            GatewayError::Store(_) | GatewayError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse::new(self.public_message()));

        (self.status_code(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the image gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;
