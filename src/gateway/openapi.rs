//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::handlers::{LoginRequest, TokenResponse};
use crate::callback::{CallbackEnvelope, LeadAcquired, StatusChanged, WorkListAssigned};
use crate::gateway::health::HealthResponse;
use crate::gateway::types::{ErrorBody, StatusResponse};
use crate::sinks::{SinkResult, SinkStatus};
use crate::submission::handlers::ValidationErrorBody;
use crate::submission::{
    BookingSubmission, FieldViolation, FormSubmission, SubmissionFailureBody, SubmissionOutcome,
};

/// Bearer token issued by `POST /authentication`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Booking Gateway API",
        version = "1.0.0",
        description = "Accepts dealer-site bookings and form leads, fans them out to the legacy order store, the CRM and the audit store, and ingests CRM callbacks."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::health::health_check,
        crate::auth::handlers::login,
        crate::submission::handlers::request_booking,
        crate::submission::handlers::request_form,
        crate::callback::handlers::request_lead_get,
        crate::callback::handlers::request_work_list,
        crate::callback::handlers::request_status,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            TokenResponse,
            ErrorBody,
            StatusResponse,
            BookingSubmission,
            FormSubmission,
            SubmissionOutcome,
            SubmissionFailureBody,
            SinkResult,
            SinkStatus,
            ValidationErrorBody,
            FieldViolation,
            CallbackEnvelope,
            LeadAcquired,
            WorkListAssigned,
            StatusChanged,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Token issuing"),
        (name = "Submissions", description = "Bookings and form leads (auth required)"),
        (name = "CRM Callbacks", description = "Events pushed by the CRM (auth required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
