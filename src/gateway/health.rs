use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Server time in milliseconds
    #[schema(example = 1760779800000_i64)]
    pub timestamp_ms: i64,
}

/// Health check
///
/// Pings the audit store. Failure details go to the log only.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Audit store unreachable", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let timestamp_ms = chrono::Utc::now().timestamp_millis();
    match state.analytics.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                timestamp_ms,
            }),
        ),
        Err(e) => {
            tracing::error!("[HEALTH] Audit store ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    timestamp_ms,
                }),
            )
        }
    }
}
