//! API error type
//!
//! Every failure surfaces as a `{success: false, error: message}` envelope
//! with a meaningful status code; nothing is fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::media::MediaError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., email already registered
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid session (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// Media store hand-off failure
    #[error("{0}")]
    Media(#[from] MediaError),

    /// quietcast-common error
    #[error(transparent)]
    Common(#[from] quietcast_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Media(err) => {
                let status = match &err {
                    MediaError::TooLarge(_) | MediaError::UnsupportedType(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            ApiError::Common(err) => {
                let status = match &err {
                    quietcast_common::Error::NotFound(_) => StatusCode::NOT_FOUND,
                    quietcast_common::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    quietcast_common::Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
