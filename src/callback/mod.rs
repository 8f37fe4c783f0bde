//! CRM callback ingestion
//!
//! Lead, work-list and status events pushed by the CRM are stored
//! verbatim in the audit store.

pub mod handlers;
pub mod ingestor;
pub mod types;

pub use ingestor::{CallbackIngestor, IngestError};
pub use types::{
    CallbackEnvelope, CallbackKind, CrmCallbackEvent, DecodeError, LeadAcquired, StatusChanged,
    WorkListAssigned,
};
