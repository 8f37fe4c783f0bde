//! In-memory sinks for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    AnalyticsSink, AuditRecord, CrmFieldList, CrmSink, LegacySink, SinkError, SinkKind, SinkResult,
};
use crate::submission::BookingSubmission;

/// Shared log of which sink was called, in call order
pub type Journal = Arc<Mutex<Vec<SinkKind>>>;

fn note(journal: &Option<Journal>, kind: SinkKind) {
    if let Some(j) = journal {
        j.lock().unwrap().push(kind);
    }
}

#[derive(Debug, Clone)]
pub enum LegacyBehavior {
    Accept,
    /// Procedure answers with a non-success status
    Reject(String),
    /// Store cannot be reached
    Unreachable,
}

pub struct MockLegacySink {
    behavior: Mutex<LegacyBehavior>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    journal: Option<Journal>,
}

impl MockLegacySink {
    pub fn new(behavior: LegacyBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            delay: None,
            calls: AtomicUsize::new(0),
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Hold every call for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_behavior(&self, behavior: LegacyBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LegacySink for MockLegacySink {
    async fn submit_booking(&self, _booking: &BookingSubmission) -> Result<SinkResult, SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        note(&self.journal, SinkKind::Legacy);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.behavior.lock().unwrap().clone() {
            LegacyBehavior::Accept => Ok(SinkResult::ok("accepted")),
            LegacyBehavior::Reject(status) => Ok(SinkResult::soft_failure(status)),
            LegacyBehavior::Unreachable => {
                Err(SinkError::hard(SinkKind::Legacy, "connection refused"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum CrmBehavior {
    Accept,
    /// CRM answers with a non-OK status
    Reject(String),
    /// Timeout, non-2xx or unreachable
    TransportError,
}

pub struct MockCrmSink {
    behavior: Mutex<CrmBehavior>,
    calls: AtomicUsize,
    sent: Mutex<Vec<CrmFieldList>>,
    journal: Option<Journal>,
}

impl MockCrmSink {
    pub fn new(behavior: CrmBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<CrmFieldList> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrmSink for MockCrmSink {
    async fn send(&self, fields: &CrmFieldList) -> Result<SinkResult, SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        note(&self.journal, SinkKind::Crm);
        self.sent.lock().unwrap().push(fields.clone());

        match self.behavior.lock().unwrap().clone() {
            CrmBehavior::Accept => Ok(SinkResult::ok("OK")),
            CrmBehavior::Reject(message) => Ok(SinkResult::soft_failure(message)),
            CrmBehavior::TransportError => {
                Err(SinkError::soft(SinkKind::Crm, "CRM request timed out"))
            }
        }
    }
}

pub struct MockAnalyticsSink {
    fail: Mutex<bool>,
    calls: AtomicUsize,
    records: Mutex<Vec<AuditRecord>>,
    journal: Option<Journal>,
}

impl MockAnalyticsSink {
    pub fn new() -> Self {
        Self {
            fail: Mutex::new(false),
            calls: AtomicUsize::new(0),
            records: Mutex::new(Vec::new()),
            journal: None,
        }
    }

    pub fn failing() -> Self {
        let sink = Self::new();
        sink.set_fail(true);
        sink
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Rows successfully written
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsSink for MockAnalyticsSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        note(&self.journal, SinkKind::Analytics);

        if *self.fail.lock().unwrap() {
            return Err(SinkError::hard(
                SinkKind::Analytics,
                "relation \"booking\" does not exist",
            ));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), SinkError> {
        if *self.fail.lock().unwrap() {
            return Err(SinkError::hard(SinkKind::Analytics, "connection refused"));
        }
        Ok(())
    }
}
