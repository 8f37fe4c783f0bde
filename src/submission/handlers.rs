use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;
use utoipa::ToSchema;

use super::outcome::{SubmissionFailureBody, SubmissionOutcome};
use super::types::{BookingSubmission, FormSubmission};
use super::validation::{FieldViolation, ValidationError};
use crate::auth::AuthenticatedPrincipal;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ErrorBody, error_codes};

/// 400 body for a submission that broke its field rules
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorBody {
    #[schema(example = 1002)]
    pub code: i32,
    #[schema(example = "VALIDATION_FAILED")]
    pub error: String,
    pub message: String,
    pub violations: Vec<FieldViolation>,
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let body = ValidationErrorBody {
            code: error_codes::VALIDATION_FAILED,
            error: "VALIDATION_FAILED".to_string(),
            message: self.to_string(),
            violations: self.violations,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Run a submission on its own task, inside a span naming the caller.
///
/// The handler future is dropped when the client disconnects; the spawned
/// task is not, so sink calls already in flight run to completion.
async fn run_detached<F>(
    principal: AuthenticatedPrincipal,
    submission: F,
) -> Result<Response, ApiError>
where
    F: Future<Output = Result<SubmissionOutcome, ValidationError>> + Send + 'static,
{
    let span = tracing::info_span!("submission", principal_id = principal.id);
    let result = tokio::spawn(submission.instrument(span)).await.map_err(|e| {
        tracing::error!("Submission task failed: {}", e);
        ApiError::internal("submission processing failed")
    })?;

    Ok(match result {
        Ok(outcome) => outcome.into_response(),
        Err(violations) => violations.into_response(),
    })
}

/// Submit a vehicle booking
///
/// POST /auth/requestbooking
#[utoipa::path(
    post,
    path = "/auth/requestbooking",
    request_body = BookingSubmission,
    responses(
        (status = 200, description = "Legacy store and CRM accepted the booking", body = SubmissionOutcome),
        (status = 400, description = "A sink reported a failure (or validation failed, see ValidationErrorBody)", body = SubmissionFailureBody),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
pub async fn request_booking(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    payload: Result<Json<BookingSubmission>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(booking) = payload?;
    tracing::info!(
        principal_id = principal.id,
        request_id = %booking.request_id,
        "Booking received"
    );

    let orchestrator = state.orchestrator.clone();
    run_detached(principal, async move {
        orchestrator.submit_booking(&booking).await
    })
    .await
}

/// Submit a site form lead
///
/// POST /auth/requestform
#[utoipa::path(
    post,
    path = "/auth/requestform",
    request_body = FormSubmission,
    responses(
        (status = 200, description = "CRM accepted the form", body = SubmissionOutcome),
        (status = 400, description = "The CRM reported a failure (or validation failed, see ValidationErrorBody)", body = SubmissionFailureBody),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
pub async fn request_form(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    payload: Result<Json<FormSubmission>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(form) = payload?;
    tracing::info!(
        principal_id = principal.id,
        request_id = %form.request_id,
        "Form received"
    );

    let orchestrator = state.orchestrator.clone();
    run_detached(principal, async move { orchestrator.submit_form(&form).await }).await
}
