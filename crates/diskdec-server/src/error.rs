//! HTTP error types for the `diskdec` server.
//!
//! Only transport-level failures become [`AppError`]s. Password policy
//! rejections and tool failures are part of the normal API response
//! (`200` with `ok: false`) and never pass through here.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use diskdec_assets::AssetError;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Requested resource not found.
    NotFound(String),
    /// Client sent a body that could not be parsed.
    BadRequest(String),
    /// Internal server error.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // Every malformed body is a 400, including a wrong content type.
        Self::BadRequest(rejection.body_text())
    }
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::InvalidName { .. } | AssetError::Missing { .. } => {
                Self::NotFound(err.to_string())
            }
            AssetError::Read { .. } => Self::Internal(err.to_string()),
        }
    }
}
