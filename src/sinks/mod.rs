//! Sink Adapters
//!
//! Adapters for the three systems a submission is written to: the legacy
//! order store, the CRM and the analytics audit store. None of them share
//! a transaction; each call is attempted once.

pub mod analytics;
pub mod crm;
pub mod legacy;

#[cfg(test)]
pub mod mock;

pub use analytics::{AuditRecord, PgAnalyticsSink};
pub use crm::{CrmField, CrmFieldList, CrmReply, HttpCrmSink};
pub use legacy::SqlLegacySink;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use crate::submission::BookingSubmission;

/// Deadline applied to every sink call
pub const SINK_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Legacy,
    Crm,
    Analytics,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SinkKind::Legacy => "legacy",
            SinkKind::Crm => "crm",
            SinkKind::Analytics => "analytics",
        };
        f.write_str(s)
    }
}

/// Hard: the sink could not be reached or invoked at all.
/// Soft: the sink answered with a business-level rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureTier {
    Hard,
    Soft,
}

impl fmt::Display for FailureTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureTier::Hard => f.write_str("hard failure"),
            FailureTier::Soft => f.write_str("soft failure"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{sink} {tier}: {message}")]
pub struct SinkError {
    pub sink: SinkKind,
    pub tier: FailureTier,
    pub message: String,
}

impl SinkError {
    pub fn hard(sink: SinkKind, message: impl Into<String>) -> Self {
        Self {
            sink,
            tier: FailureTier::Hard,
            message: message.into(),
        }
    }

    pub fn soft(sink: SinkKind, message: impl Into<String>) -> Self {
        Self {
            sink,
            tier: FailureTier::Soft,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum SinkStatus {
    Ok,
    SoftFailure,
    HardFailure,
}

/// Outcome of one sink invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SinkResult {
    pub status: SinkStatus,
    pub message: String,
}

impl SinkResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: SinkStatus::Ok,
            message: message.into(),
        }
    }

    pub fn soft_failure(message: impl Into<String>) -> Self {
        Self {
            status: SinkStatus::SoftFailure,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == SinkStatus::Ok
    }
}

impl From<SinkError> for SinkResult {
    fn from(e: SinkError) -> Self {
        let status = match e.tier {
            FailureTier::Hard => SinkStatus::HardFailure,
            FailureTier::Soft => SinkStatus::SoftFailure,
        };
        Self {
            status,
            message: e.message,
        }
    }
}

/// A typed SQL parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    OptText(Option<String>),
    Int(i64),
    Bool(bool),
    Date(Option<NaiveDate>),
    Timestamp(Option<NaiveDateTime>),
}

impl SqlValue {
    pub fn bind_to<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::OptText(v) => query.bind(v.clone()),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Date(v) => query.bind(*v),
            SqlValue::Timestamp(v) => query.bind(*v),
        }
    }
}

/// `$1, $2, ..., $n`
pub(crate) fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Legacy order store. `Err` is always a hard failure.
#[async_trait]
pub trait LegacySink: Send + Sync {
    async fn submit_booking(&self, booking: &BookingSubmission) -> Result<SinkResult, SinkError>;
}

/// External CRM. Every failure is soft from the caller's point of view.
#[async_trait]
pub trait CrmSink: Send + Sync {
    async fn send(&self, fields: &CrmFieldList) -> Result<SinkResult, SinkError>;
}

/// Durable audit store: one row, one transaction
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, record: &AuditRecord) -> Result<(), SinkError>;

    async fn ping(&self) -> Result<(), SinkError>;
}
