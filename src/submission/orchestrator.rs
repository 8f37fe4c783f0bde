//! Submission fan-out.
//!
//! Booking: legacy store, then CRM, then audit store. Form: CRM, then
//! audit store. Calls are sequential and each sink is tried once.
//!
//! | Failure                 | Effect                                      |
//! |-------------------------|---------------------------------------------|
//! | validation              | nothing is called                           |
//! | legacy hard             | CRM and audit skipped, reported alone       |
//! | legacy soft / any CRM   | recorded, pipeline continues                |
//! | audit                   | logged only, never reported                 |

use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::outcome::SubmissionOutcome;
use super::types::{BookingSubmission, FormSubmission};
use super::validation::ValidationError;
use crate::sinks::{AnalyticsSink, AuditRecord, CrmFieldList, CrmSink, LegacySink, SinkResult};

pub struct SubmissionOrchestrator {
    legacy: Arc<dyn LegacySink>,
    crm: Arc<dyn CrmSink>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl SubmissionOrchestrator {
    pub fn new(
        legacy: Arc<dyn LegacySink>,
        crm: Arc<dyn CrmSink>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            legacy,
            crm,
            analytics,
        }
    }

    pub async fn submit_booking(
        &self,
        booking: &BookingSubmission,
    ) -> Result<SubmissionOutcome, ValidationError> {
        let span = tracing::info_span!(
            "booking",
            submission_id = %Uuid::new_v4(),
            request_id = %booking.request_id,
            action_type = %booking.action_type,
        );
        self.run_booking(booking).instrument(span).await
    }

    async fn run_booking(
        &self,
        booking: &BookingSubmission,
    ) -> Result<SubmissionOutcome, ValidationError> {
        booking.check().inspect_err(|e| {
            tracing::warn!(violations = e.violations.len(), "Booking rejected: {}", e);
        })?;

        let legacy = match self.legacy.submit_booking(booking).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Legacy store unavailable, aborting booking: {}", e);
                return Ok(SubmissionOutcome::legacy_unavailable(e));
            }
        };

        let crm = self.notify_crm(&booking.crm_fields()).await;
        self.audit(&booking.audit_record()).await;

        let outcome = SubmissionOutcome::booking(legacy, crm);
        tracing::info!(ok = outcome.is_ok(), "Booking processed");
        Ok(outcome)
    }

    pub async fn submit_form(
        &self,
        form: &FormSubmission,
    ) -> Result<SubmissionOutcome, ValidationError> {
        let span = tracing::info_span!(
            "form",
            submission_id = %Uuid::new_v4(),
            request_id = %form.request_id,
            form_name = %form.form_name,
        );
        self.run_form(form).instrument(span).await
    }

    async fn run_form(&self, form: &FormSubmission) -> Result<SubmissionOutcome, ValidationError> {
        form.check().inspect_err(|e| {
            tracing::warn!(violations = e.violations.len(), "Form rejected: {}", e);
        })?;

        let crm = self.notify_crm(&form.crm_fields()).await;
        self.audit(&form.audit_record()).await;

        let outcome = SubmissionOutcome::form(crm);
        tracing::info!(ok = outcome.is_ok(), "Form processed");
        Ok(outcome)
    }

    async fn notify_crm(&self, fields: &CrmFieldList) -> SinkResult {
        match self.crm.send(fields).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("CRM call failed: {}", e);
                e.into()
            }
        }
    }

    async fn audit(&self, record: &AuditRecord) {
        if let Err(e) = self.analytics.record(record).await {
            tracing::error!(table = record.table, "Audit write failed: {}", e);
        }
    }
}
