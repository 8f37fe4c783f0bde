//! Booking and form submissions
//!
//! Field rules, the fan-out orchestrator and the HTTP handlers.

pub mod handlers;
pub mod orchestrator;
pub mod outcome;
pub mod types;
pub mod validation;

pub use orchestrator::SubmissionOrchestrator;
pub use outcome::{SubmissionFailureBody, SubmissionOutcome};
pub use types::{BookingSubmission, FormSubmission};
pub use validation::{FieldViolation, ValidationError};

#[cfg(test)]
pub use types::fixtures;
