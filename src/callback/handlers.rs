use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::ingestor::IngestError;
use super::types::{CallbackEnvelope, CallbackKind, DecodeError};
use crate::gateway::state::AppState;
use crate::gateway::types::StatusResponse;

async fn ingest(
    state: &AppState,
    kind: CallbackKind,
    payload: Result<Json<CallbackEnvelope>, JsonRejection>,
) -> Result<Json<StatusResponse>, IngestError> {
    let Json(envelope) = payload.map_err(|rejection| {
        tracing::warn!(kind = %kind, "Callback body rejected: {}", rejection.body_text());
        IngestError::Decode(DecodeError::Malformed(rejection.body_text()))
    })?;

    state.callbacks.ingest(kind, envelope).await?;
    Ok(Json(StatusResponse::ok(kind.acknowledgement())))
}

/// CRM took a lead into work
///
/// POST /auth/requestleadget
#[utoipa::path(
    post,
    path = "/auth/requestleadget",
    request_body = CallbackEnvelope,
    responses(
        (status = 200, description = "Event stored", body = StatusResponse),
        (status = 400, description = "Malformed event or write failure", body = StatusResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "CRM Callbacks"
)]
pub async fn request_lead_get(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CallbackEnvelope>, JsonRejection>,
) -> Result<Json<StatusResponse>, IngestError> {
    ingest(&state, CallbackKind::LeadGet, payload).await
}

/// CRM assigned a client to a work list
///
/// POST /auth/requestworklist
#[utoipa::path(
    post,
    path = "/auth/requestworklist",
    request_body = CallbackEnvelope,
    responses(
        (status = 200, description = "Event stored", body = StatusResponse),
        (status = 400, description = "Malformed event or write failure", body = StatusResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "CRM Callbacks"
)]
pub async fn request_work_list(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CallbackEnvelope>, JsonRejection>,
) -> Result<Json<StatusResponse>, IngestError> {
    ingest(&state, CallbackKind::WorkList, payload).await
}

/// CRM changed a request's status
///
/// POST /auth/requeststatus
#[utoipa::path(
    post,
    path = "/auth/requeststatus",
    request_body = CallbackEnvelope,
    responses(
        (status = 200, description = "Event stored", body = StatusResponse),
        (status = 400, description = "Malformed event or write failure", body = StatusResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "CRM Callbacks"
)]
pub async fn request_status(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CallbackEnvelope>, JsonRejection>,
) -> Result<Json<StatusResponse>, IngestError> {
    ingest(&state, CallbackKind::Statuses, payload).await
}
