//! Authentication error types.
//!
//! Every failure on the access path renders as 401 except a principal
//! store outage, which is a server error.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Why a bearer token was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token has expired")]
    Expired,
}

impl TokenError {
    pub fn name(self) -> &'static str {
        match self {
            Self::Malformed => "TOKEN_MALFORMED",
            Self::SignatureInvalid => "TOKEN_SIGNATURE_INVALID",
            Self::Expired => "TOKEN_EXPIRED",
        }
    }
}

/// Why the credential did not admit the caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("Authorization header is not a Bearer credential")]
    InvalidScheme,
    #[error("{0}")]
    Token(TokenError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable credential was presented
    #[error("unauthenticated: {0}")]
    Unauthenticated(UnauthenticatedReason),

    /// Credential was valid but its principal no longer exists
    #[error("principal not found")]
    Unauthorized,

    /// Login rejected. One message for unknown user and wrong password.
    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("principal store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        AuthError::Unauthenticated(UnauthenticatedReason::Token(e))
    }
}

impl AuthError {
    pub fn code(&self) -> i32 {
        match self {
            Self::Unauthenticated(_) => 2001,
            Self::Unauthorized => 2002,
            Self::InvalidCredentials => 2003,
            Self::StoreUnavailable(_) => 5001,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unauthenticated(UnauthenticatedReason::Token(t)) => t.name(),
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::StoreUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// JSON response body for auth errors.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub code: i32,
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Store details stay in the logs
            Self::StoreUnavailable(_) => "authentication temporarily unavailable".to_string(),
            other => other.to_string(),
        };
        let body = AuthErrorResponse {
            code: self.code(),
            error: self.name(),
            message,
        };
        (self.http_status(), Json(body)).into_response()
    }
}
