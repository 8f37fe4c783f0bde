use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::principal::authenticate;
use crate::gateway::state::AppState;
use crate::gateway::types::ApiError;

/// Login Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "site@dealer.example")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    /// Expiry instant (RFC 3339)
    #[schema(value_type = String, example = "2026-10-18T12:00:00Z")]
    pub exp: DateTime<Utc>,
}

/// Exchange credentials for a bearer token
///
/// POST /authentication
#[utoipa::path(
    post,
    path = "/authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload.map_err(ApiError::from)?;

    let principal = authenticate(state.principals.as_ref(), &req.email, &req.password)
        .await
        .inspect_err(|e| tracing::warn!(email = %req.email, "Login failed: {}", e))?;

    let issued = state.tokens.issue(principal.id).map_err(|e| {
        tracing::error!(principal_id = principal.id, "Token signing failed: {}", e);
        ApiError::internal("token error")
    })?;

    tracing::info!(principal_id = principal.id, "Token issued");
    Ok(Json(TokenResponse {
        token: issued.token,
        exp: issued.expires_at,
    }))
}

