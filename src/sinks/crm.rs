//! CRM HTTP adapter.
//!
//! The CRM takes `{"Data": [{"key": "value"}, ...]}`: every attribute is its
//! own single-key object and the list order is fixed.

use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::time::Duration;

use super::{CrmSink, SinkError, SinkKind, SinkResult};
use crate::config::CrmConfig;
use crate::submission::{BookingSubmission, FormSubmission};

/// Attribute order of the CRM request
pub const CRM_FIELD_ORDER: &[&str] = &[
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
    "ClientID",
    "metrics_type",
    "client_IP",
    "client_type",
    "client_company_name",
    "client_name",
    "client_email",
    "client_phone_number",
    "commentary",
    "agreement_mailing",
];

const CRM_OK: &str = "OK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmField {
    pub key: &'static str,
    pub value: String,
}

impl Serialize for CrmField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, &self.value)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrmFieldList {
    #[serde(rename = "Data")]
    pub data: Vec<CrmField>,
}

impl CrmFieldList {
    /// Pair `CRM_FIELD_ORDER` with values given in the same order
    fn from_values(values: [&str; 21]) -> Self {
        let data = CRM_FIELD_ORDER
            .iter()
            .zip(values)
            .map(|(&key, value)| CrmField {
                key,
                value: value.to_string(),
            })
            .collect();
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }
}

/// `{status, message}` answer of the CRM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmReply {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl BookingSubmission {
    pub fn crm_fields(&self) -> CrmFieldList {
        CrmFieldList::from_values([
            &self.event_datetime,
            &self.request_id,
            &self.subdivisions_id,
            &self.subdivisions_name,
            &self.form_name,
            &self.id_form,
            &self.host_name,
            &self.division,
            &self.area,
            &self.brand_name,
            &self.car_model,
            &self.client_id,
            &self.metrics_type,
            &self.client_ip,
            &self.client_type,
            &self.client_company_name,
            &self.client_name,
            &self.client_email,
            &self.client_phone_number,
            &self.commentary,
            &self.agreement_mailing,
        ])
    }
}

impl FormSubmission {
    pub fn crm_fields(&self) -> CrmFieldList {
        CrmFieldList::from_values([
            &self.event_datetime,
            &self.request_id,
            &self.subdivisions_id,
            &self.subdivisions_name,
            &self.form_name,
            &self.id_form,
            &self.host_name,
            &self.division,
            &self.area,
            &self.brand_name,
            &self.car_model,
            &self.client_id,
            &self.metrics_type,
            &self.client_ip,
            &self.client_type,
            &self.client_company_name,
            &self.client_name,
            &self.client_email,
            &self.client_phone_number,
            &self.commentary,
            &self.agreement_mailing,
        ])
    }
}

#[derive(Clone)]
pub struct HttpCrmSink {
    url: String,
    client: reqwest::Client,
}

impl HttpCrmSink {
    pub fn new(config: &CrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            url: config.url.clone(),
            client,
        })
    }
}

#[async_trait]
impl CrmSink for HttpCrmSink {
    async fn send(&self, fields: &CrmFieldList) -> Result<SinkResult, SinkError> {
        let response = self
            .client
            .post(&self.url)
            .json(fields)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "CRM request timed out".to_string()
                } else {
                    format!("CRM request failed: {e}")
                };
                SinkError::soft(SinkKind::Crm, message)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::soft(
                SinkKind::Crm,
                format!("CRM responded with HTTP {}", status.as_u16()),
            ));
        }

        let reply = response
            .json::<CrmReply>()
            .await
            .map_err(|e| SinkError::soft(SinkKind::Crm, format!("invalid CRM response: {e}")))?;

        if reply.status == CRM_OK {
            Ok(SinkResult::ok(reply.message))
        } else {
            tracing::warn!(crm_status = %reply.status, "CRM rejected submission: {}", reply.message);
            let message = if reply.message.is_empty() {
                format!("CRM status {}", reply.status)
            } else {
                reply.message
            };
            Ok(SinkResult::soft_failure(message))
        }
    }
}
