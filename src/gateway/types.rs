//! Shared response bodies and the catch-all API error
//!
//! - `ErrorBody`: `{code, error, message}` body used by every error path
//! - `StatusResponse`: `{status, response}` body of the callback routes
//! - `ApiError`: errors raised outside the domain modules (bad JSON, internals)
//! - `error_codes`: standard error code constants

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthError;

/// Error body shared by all routes
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = 1001)]
    pub code: i32,
    #[schema(example = "INVALID_PARAMETER")]
    pub error: String,
    pub message: String,
}

/// `{status, response}` acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "Ok")]
    pub status: String,
    #[schema(example = "data statuses received")]
    pub response: String,
}

impl StatusResponse {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            status: "Ok".to_string(),
            response: response.into(),
        }
    }

    pub fn error(response: impl Into<String>) -> Self {
        Self {
            status: "Error".to_string(),
            response: response.into(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be decoded
    BadRequest(String),
    Auth(AuthError),
    Internal(String),
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Auth(e) => return e.into_response(),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: error_codes::INVALID_PARAMETER,
                    error: "INVALID_PARAMETER".to_string(),
                    message,
                },
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: error_codes::INTERNAL_ERROR,
                    error: "INTERNAL_ERROR".to_string(),
                    message,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Standard API error codes
pub mod error_codes {
    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const VALIDATION_FAILED: i32 = 1002;

    // Sink errors (3xxx)
    pub const SINK_FAILURE: i32 = 3001;
    pub const LEGACY_UNAVAILABLE: i32 = 3002;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
}
