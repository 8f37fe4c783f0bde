//! CRM callback events.
//!
//! The CRM posts `{"Data": [{"key": "value"}, ...]}` (sometimes a flat
//! `{"Data": {...}}`). Entries are merged by key before decoding into the
//! named fields of the event, so element order does not matter.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::sinks::{AuditRecord, SqlValue};
use crate::submission::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    LeadGet,
    WorkList,
    Statuses,
}

impl CallbackKind {
    pub fn name(&self) -> &'static str {
        match self {
            CallbackKind::LeadGet => "lead_get",
            CallbackKind::WorkList => "work_list",
            CallbackKind::Statuses => "statuses",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            CallbackKind::LeadGet => "gazcrm_lead_get",
            CallbackKind::WorkList => "gazcrm_work_list",
            CallbackKind::Statuses => "gazcrm_statuses",
        }
    }

    pub fn acknowledgement(&self) -> String {
        format!("data {} received", self.name())
    }
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("{0}")]
    Invalid(#[from] ValidationError),
}

/// Raw `{"Data": ...}` body
#[derive(Debug, Deserialize, ToSchema)]
pub struct CallbackEnvelope {
    #[serde(rename = "Data")]
    #[schema(value_type = Object)]
    pub data: Value,
}

const LEAD_GET_COLUMNS: &[&str] = &[
    "event_datetime",
    "event_name",
    "request_id",
    "subdivisions_id",
    "subdivisions_name",
    "form_name",
    "host_name",
    "division",
    "area",
    "brand_name",
    "client_id",
    "metrics_type",
];

const WORK_LIST_COLUMNS: &[&str] = &[
    "event_datetime",
    "event_name",
    "gazcrm_client_id",
    "gazcrm_worklist_id",
];

const STATUSES_COLUMNS: &[&str] = &[
    "event_datetime",
    "event_name",
    "request_id",
    "gazcrm_client_id",
    "gazcrm_worklist_id",
    "client_id",
    "metrics_type",
];

/// Lead taken into work by the CRM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct LeadAcquired {
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub event_datetime: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub event_name: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub subdivisions_id: Option<String>,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub subdivisions_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub form_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub host_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub division: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub area: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub brand_name: String,
    #[serde(rename = "ClientID")]
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub client_id: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub metrics_type: String,
}

/// Client attached to a CRM work list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct WorkListAssigned {
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub event_datetime: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub event_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub gazcrm_client_id: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub gazcrm_worklist_id: String,
}

/// Status change of a request inside the CRM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct StatusChanged {
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub event_datetime: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub event_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub request_id: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub gazcrm_client_id: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub gazcrm_worklist_id: String,
    #[serde(rename = "ClientID")]
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub client_id: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub metrics_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrmCallbackEvent {
    LeadAcquired(LeadAcquired),
    WorkListAssigned(WorkListAssigned),
    StatusChanged(StatusChanged),
}

/// Flatten `Data` into one key/value map
fn merge_entries(data: Value) -> Result<Map<String, Value>, DecodeError> {
    let entries = match data {
        Value::Object(map) => return Ok(map),
        Value::Array(entries) => entries,
        other => {
            return Err(DecodeError::Malformed(format!(
                "Data must be an array or object, got {}",
                json_type(&other)
            )));
        }
    };

    let mut merged = Map::new();
    for entry in entries {
        let Value::Object(fields) = entry else {
            return Err(DecodeError::Malformed(
                "Data entries must be objects".to_string(),
            ));
        };
        for (key, value) in fields {
            if merged.contains_key(&key) {
                return Err(DecodeError::Malformed(format!("duplicate key {:?}", key)));
            }
            merged.insert(key, value);
        }
    }
    Ok(merged)
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn decode_fields<T>(data: Value) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Validate,
{
    let merged = merge_entries(data)?;
    let event: T = serde_json::from_value(Value::Object(merged))
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    event.validate().map_err(ValidationError::from)?;
    Ok(event)
}

impl CrmCallbackEvent {
    pub fn decode(kind: CallbackKind, envelope: CallbackEnvelope) -> Result<Self, DecodeError> {
        let event = match kind {
            CallbackKind::LeadGet => Self::LeadAcquired(decode_fields(envelope.data)?),
            CallbackKind::WorkList => Self::WorkListAssigned(decode_fields(envelope.data)?),
            CallbackKind::Statuses => Self::StatusChanged(decode_fields(envelope.data)?),
        };
        Ok(event)
    }

    pub fn kind(&self) -> CallbackKind {
        match self {
            Self::LeadAcquired(_) => CallbackKind::LeadGet,
            Self::WorkListAssigned(_) => CallbackKind::WorkList,
            Self::StatusChanged(_) => CallbackKind::Statuses,
        }
    }

    pub fn event_name(&self) -> &str {
        match self {
            Self::LeadAcquired(e) => &e.event_name,
            Self::WorkListAssigned(e) => &e.event_name,
            Self::StatusChanged(e) => &e.event_name,
        }
    }

    /// Row for the event's table; values are kept as received
    pub fn audit_record(&self) -> AuditRecord {
        let text = |s: &str| SqlValue::Text(s.to_string());
        let (columns, values) = match self {
            Self::LeadAcquired(e) => (
                LEAD_GET_COLUMNS,
                vec![
                    text(&e.event_datetime),
                    text(&e.event_name),
                    SqlValue::OptText(e.request_id.clone()),
                    SqlValue::OptText(e.subdivisions_id.clone()),
                    text(&e.subdivisions_name),
                    text(&e.form_name),
                    text(&e.host_name),
                    text(&e.division),
                    text(&e.area),
                    text(&e.brand_name),
                    text(&e.client_id),
                    text(&e.metrics_type),
                ],
            ),
            Self::WorkListAssigned(e) => (
                WORK_LIST_COLUMNS,
                vec![
                    text(&e.event_datetime),
                    text(&e.event_name),
                    text(&e.gazcrm_client_id),
                    text(&e.gazcrm_worklist_id),
                ],
            ),
            Self::StatusChanged(e) => (
                STATUSES_COLUMNS,
                vec![
                    text(&e.event_datetime),
                    text(&e.event_name),
                    text(&e.request_id),
                    text(&e.gazcrm_client_id),
                    text(&e.gazcrm_worklist_id),
                    text(&e.client_id),
                    text(&e.metrics_type),
                ],
            ),
        };
        AuditRecord {
            table: self.kind().table(),
            columns,
            values,
        }
    }
}
