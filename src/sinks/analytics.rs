//! Analytics audit store adapter.
//!
//! One record is one row in one table, written in its own transaction.
//! Column lists are always explicit.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use super::{AnalyticsSink, SINK_TIMEOUT_SECS, SinkError, SinkKind, SqlValue, placeholders};
use crate::db::LazyPool;
use crate::submission::{BookingSubmission, FormSubmission};

pub const BOOKING_TABLE: &str = "booking";

pub const BOOKING_COLUMNS: &[&str] = &[
    "request_id",
    "action_type",
    "uniq_mod_code",
    "modification",
    "mod_family",
    "mod_body_type",
    "mod_engine",
    "mod_base",
    "mod_tuning",
    "vin",
    "price",
    "client_type",
    "inn",
    "kpp",
    "ogrn",
    "reg_address_code",
    "delivery_address_code",
    "delivery_address",
    "hid",
    "client_company_name",
    "representative_name",
    "representative_surname",
    "surname",
    "client_name",
    "patronymic",
    "passport_ser",
    "passport_number",
    "snils",
    "date_of_birth",
    "client_email",
    "client_phone_number",
    "commentary",
    "agreement_mailing",
    "event_datetime",
    "file",
    "bill_number",
    "url_mod",
    "clientid_google",
    "client_id",
    "testmod",
];

pub const FORMS_TABLE: &str = "forms";

pub const FORMS_COLUMNS: &[&str] = &[
    "event_datetime",
    "request_id",
    "subdivisions_id",
    "subdivisions_name",
    "form_name",
    "id_form",
    "host_name",
    "division",
    "area",
    "brand_name",
    "car_model",
    "client_id",
    "metrics_type",
    "client_ip",
    "client_type",
    "client_company_name",
    "client_name",
    "client_email",
    "client_phone_number",
    "commentary",
    "agreement_mailing",
    "action_type",
    "modification",
    "mod_family",
    "mod_body_type",
    "mod_engine",
    "mod_base",
    "mod_tuning",
    "vin",
    "price",
    "url_mod",
];

/// A row destined for the audit store
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub values: Vec<SqlValue>,
}

impl AuditRecord {
    pub fn insert_statement(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            placeholders(self.columns.len())
        )
    }
}

fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

impl BookingSubmission {
    pub fn audit_record(&self) -> AuditRecord {
        let values = vec![
            text(&self.request_id),
            text(&self.action_type),
            SqlValue::Int(self.uniq_mod_code),
            text(&self.modification),
            text(&self.mod_family),
            text(&self.mod_body_type),
            text(&self.mod_engine),
            text(&self.mod_base),
            text(&self.mod_tuning),
            text(&self.vin),
            SqlValue::Int(self.price),
            text(&self.client_type),
            text(&self.inn),
            text(&self.kpp),
            text(&self.ogrn),
            text(&self.reg_address_code),
            text(&self.delivery_address_code),
            text(&self.delivery_address),
            text(&self.hid),
            text(&self.client_company_name),
            text(&self.representative_name),
            text(&self.representative_surname),
            text(&self.surname),
            text(&self.client_name),
            text(&self.patronymic),
            text(&self.passport_ser),
            text(&self.passport_number),
            text(&self.snils),
            SqlValue::Date(self.birth_date()),
            text(&self.client_email),
            text(&self.client_phone_number),
            text(&self.commentary),
            text(&self.agreement_mailing),
            SqlValue::Timestamp(self.event_time()),
            text(&self.file),
            text(&self.bill_number),
            text(&self.url_mod),
            text(&self.clientid_google),
            text(&self.client_id),
            SqlValue::Bool(self.testmod),
        ];
        AuditRecord {
            table: BOOKING_TABLE,
            columns: BOOKING_COLUMNS,
            values,
        }
    }
}

impl FormSubmission {
    pub fn audit_record(&self) -> AuditRecord {
        let values = vec![
            SqlValue::Timestamp(self.event_time()),
            text(&self.request_id),
            text(&self.subdivisions_id),
            text(&self.subdivisions_name),
            text(&self.form_name),
            text(&self.id_form),
            text(&self.host_name),
            text(&self.division),
            text(&self.area),
            text(&self.brand_name),
            text(&self.car_model),
            text(&self.client_id),
            text(&self.metrics_type),
            text(&self.client_ip),
            text(&self.client_type),
            text(&self.client_company_name),
            text(&self.client_name),
            text(&self.client_email),
            text(&self.client_phone_number),
            text(&self.commentary),
            text(&self.agreement_mailing),
            text(&self.action_type),
            text(&self.modification),
            text(&self.mod_family),
            text(&self.mod_body_type),
            text(&self.mod_engine),
            text(&self.mod_base),
            text(&self.mod_tuning),
            text(&self.vin),
            SqlValue::Int(self.price),
            text(&self.url_mod),
        ];
        AuditRecord {
            table: FORMS_TABLE,
            columns: FORMS_COLUMNS,
            values,
        }
    }
}

pub struct PgAnalyticsSink {
    pool: Arc<LazyPool>,
    timeout: Duration,
}

impl PgAnalyticsSink {
    pub fn new(pool: Arc<LazyPool>) -> Self {
        Self {
            pool,
            timeout: Duration::from_secs(SINK_TIMEOUT_SECS),
        }
    }

    async fn insert(&self, record: &AuditRecord) -> Result<(), sqlx::Error> {
        let pool = self.pool.get()?;
        let statement = record.insert_statement();

        let mut tx = pool.begin().await?;
        let mut query = sqlx::query(&statement);
        for value in &record.values {
            query = value.bind_to(query);
        }
        query.execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl AnalyticsSink for PgAnalyticsSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), SinkError> {
        if record.columns.len() != record.values.len() {
            return Err(SinkError::hard(
                SinkKind::Analytics,
                format!(
                    "{}: {} columns but {} values",
                    record.table,
                    record.columns.len(),
                    record.values.len()
                ),
            ));
        }

        match timeout(self.timeout, self.insert(record)).await {
            Ok(Ok(())) => {
                tracing::debug!(table = record.table, "Audit row written");
                Ok(())
            }
            Ok(Err(e)) => Err(SinkError::hard(SinkKind::Analytics, e.to_string())),
            Err(_) => Err(SinkError::hard(
                SinkKind::Analytics,
                format!("timed out after {}s", self.timeout.as_secs()),
            )),
        }
    }

    async fn ping(&self) -> Result<(), SinkError> {
        match timeout(self.timeout, self.pool.health_check()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(SinkError::hard(SinkKind::Analytics, e.to_string())),
            Err(_) => Err(SinkError::hard(SinkKind::Analytics, "health check timed out")),
        }
    }
}
