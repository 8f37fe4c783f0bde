use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use thiserror::Error;

use super::types::{CallbackEnvelope, CallbackKind, CrmCallbackEvent, DecodeError};
use crate::gateway::types::StatusResponse;
use crate::sinks::{AnalyticsSink, SinkError};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Store details stay in the log; the CRM only sees this text
    #[error("error storing callback data")]
    Write(#[source] SinkError),
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(StatusResponse::error(self.to_string())),
        )
            .into_response()
    }
}

/// Writes CRM callback events to the audit store. Unlike submissions, a
/// failed write is reported to the caller.
pub struct CallbackIngestor {
    analytics: Arc<dyn AnalyticsSink>,
}

impl CallbackIngestor {
    pub fn new(analytics: Arc<dyn AnalyticsSink>) -> Self {
        Self { analytics }
    }

    pub async fn ingest(
        &self,
        kind: CallbackKind,
        envelope: CallbackEnvelope,
    ) -> Result<CrmCallbackEvent, IngestError> {
        let event = CrmCallbackEvent::decode(kind, envelope).inspect_err(|e| {
            tracing::warn!(kind = %kind, "Callback rejected: {}", e);
        })?;

        self.analytics
            .record(&event.audit_record())
            .await
            .map_err(|e| {
                tracing::error!(kind = %kind, event_name = event.event_name(), "Callback write failed: {}", e);
                IngestError::Write(e)
            })?;

        tracing::info!(kind = %kind, event_name = event.event_name(), "Callback stored");
        Ok(event)
    }
}
