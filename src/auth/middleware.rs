//! Access gate for protected routes.
//!
//! A request reaches its handler only if it carries a valid, unexpired
//! bearer token AND the token's principal still exists.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::{AuthError, UnauthenticatedReason};
use super::principal::PrincipalId;
use crate::gateway::state::AppState;

/// Resolved caller, inserted into request extensions by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub id: PrincipalId,
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Unauthenticated(UnauthenticatedReason::MissingHeader))?
        .to_str()
        .map_err(|_| AuthError::Unauthenticated(UnauthenticatedReason::InvalidScheme))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::Unauthenticated(
            UnauthenticatedReason::InvalidScheme,
        )),
    }
}

pub async fn access_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();

    // 1. Credential present and well-formed
    let token = extract_bearer(request.headers()).inspect_err(|e| {
        warn!(path = %path, "Access denied: {}", e);
    })?;

    // 2. Signature + expiry
    let principal_id = state.tokens.validate(token).map_err(|e| {
        warn!(path = %path, "Access denied: {}", e);
        AuthError::from(e)
    })?;

    // 3. Principal must still exist
    match state.principals.exists(principal_id).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(path = %path, principal_id, "Access denied: principal no longer exists");
            return Err(AuthError::Unauthorized);
        }
        Err(e) => {
            warn!(path = %path, principal_id, "Principal lookup failed: {}", e);
            return Err(e);
        }
    }

    debug!(path = %path, principal_id, "Access granted");
    request
        .extensions_mut()
        .insert(AuthenticatedPrincipal { id: principal_id });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(v) = value {
            h.insert(header::AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        }
        h
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&headers(Some("Bearer abc.def.ghi"))), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            extract_bearer(&headers(None)),
            Err(AuthError::Unauthenticated(UnauthenticatedReason::MissingHeader))
        );
    }

    #[test]
    fn test_wrong_scheme() {
        for v in ["Basic dXNlcjpwYXNz", "Bearer ", "bearer abc", "abc"] {
            assert_eq!(
                extract_bearer(&headers(Some(v))),
                Err(AuthError::Unauthenticated(UnauthenticatedReason::InvalidScheme)),
                "header {:?}",
                v
            );
        }
    }
}
