use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::gateway::types::error_codes;
use crate::sinks::{SinkError, SinkResult, SinkStatus};

/// Caller-visible result of a submission.
///
/// Only the legacy store and the CRM are reported. A sink that was not
/// attempted is omitted from the body. A failed submission also carries
/// the usual `{code, error, message}` fields alongside the sink results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubmissionOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy: Option<SinkResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm: Option<SinkResult>,
}

impl SubmissionOutcome {
    /// Legacy store could not be invoked; nothing else ran
    pub fn legacy_unavailable(err: SinkError) -> Self {
        Self {
            legacy: Some(err.into()),
            crm: None,
        }
    }

    pub fn booking(legacy: SinkResult, crm: SinkResult) -> Self {
        Self {
            legacy: Some(legacy),
            crm: Some(crm),
        }
    }

    pub fn form(crm: SinkResult) -> Self {
        Self {
            legacy: None,
            crm: Some(crm),
        }
    }

    pub fn is_ok(&self) -> bool {
        [&self.legacy, &self.crm]
            .into_iter()
            .flatten()
            .all(SinkResult::is_ok)
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_ok() {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        }
    }

    fn legacy_hard_failure(&self) -> bool {
        matches!(&self.legacy, Some(r) if r.status == SinkStatus::HardFailure)
    }

    /// `legacy: <message>; crm: <message>` for every failed sink
    fn failure_summary(&self) -> String {
        [("legacy", &self.legacy), ("crm", &self.crm)]
            .into_iter()
            .filter_map(|(name, result)| match result {
                Some(r) if !r.is_ok() => Some(format!("{}: {}", name, r.message)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// 400 body: error fields plus the per-sink results
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionFailureBody {
    #[schema(example = 3001)]
    pub code: i32,
    #[schema(example = "SINK_FAILURE")]
    pub error: String,
    pub message: String,
    #[serde(flatten)]
    pub outcome: SubmissionOutcome,
}

impl From<SubmissionOutcome> for SubmissionFailureBody {
    fn from(outcome: SubmissionOutcome) -> Self {
        let (code, error) = if outcome.legacy_hard_failure() {
            (error_codes::LEGACY_UNAVAILABLE, "LEGACY_UNAVAILABLE")
        } else {
            (error_codes::SINK_FAILURE, "SINK_FAILURE")
        };
        Self {
            code,
            error: error.to_string(),
            message: outcome.failure_summary(),
            outcome,
        }
    }
}

impl IntoResponse for SubmissionOutcome {
    fn into_response(self) -> Response {
        if self.is_ok() {
            return (StatusCode::OK, Json(self)).into_response();
        }
        (
            StatusCode::BAD_REQUEST,
            Json(SubmissionFailureBody::from(self)),
        )
            .into_response()
    }
}
