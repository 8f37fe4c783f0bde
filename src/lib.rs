//! Booking Gateway
//!
//! Accepts vehicle bookings and site form leads from dealer web front-ends,
//! fans each one out to the legacy order store, the CRM and the analytics
//! audit store, and stores events the CRM pushes back.
//!
//! # Modules
//!
//! - [`auth`] - Bearer tokens, principals and the access gate
//! - [`submission`] - Field rules and the fan-out orchestrator
//! - [`sinks`] - Legacy store, CRM and audit store adapters
//! - [`callback`] - CRM callback ingestion
//! - [`gateway`] - Router, shared state and OpenAPI docs
//! - [`db`] - Memoized PostgreSQL pools
//! - [`config`] - YAML configuration
//! - [`logging`] - Tracing setup

pub mod auth;
pub mod callback;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod sinks;
pub mod submission;

// Convenient re-exports at crate root
pub use auth::{AuthError, TokenService};
pub use callback::{CallbackIngestor, CrmCallbackEvent};
pub use sinks::{SinkError, SinkResult, SinkStatus};
pub use submission::{
    BookingSubmission, FormSubmission, SubmissionOrchestrator, SubmissionOutcome, ValidationError,
};
