//! Field rules for submissions.
//!
//! Enumeration and format rules accept an empty value; requiredness is a
//! separate `length(min = 1)` rule on the field. A field that is both
//! required and enumerated therefore reports exactly one violation when
//! it is missing.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;
use validator::{ValidationError as RuleError, ValidationErrors};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub const CLIENT_TYPES: &[&str] = &["company", "personal"];
pub const CONSENT_VALUES: &[&str] = &["yes", "no"];
pub const BOOKING_ACTIONS: &[&str] = &["form", "bill", "acquiring"];
pub const FORM_ACTIONS: &[&str] = &["form"];
pub const DIVISIONS: &[&str] = &["lcv/mcv", "bus"];
pub const AREAS: &[&str] = &["dealer", "distrib"];
pub const METRICS_TYPES: &[&str] = &["yandex"];

/// Rust field names that differ from their JSON keys
const WIRE_NAMES: &[(&str, &str)] = &[("client_id", "ClientID"), ("client_ip", "client_IP")];

fn wire_name(field: &str) -> String {
    WIRE_NAMES
        .iter()
        .find(|(rust, _)| *rust == field)
        .map(|(_, wire)| wire.to_string())
        .unwrap_or_else(|| field.to_string())
}

fn one_of(value: &str, allowed: &[&str]) -> Result<(), RuleError> {
    if value.is_empty() || allowed.contains(&value) {
        return Ok(());
    }
    let mut err = RuleError::new("one_of");
    err.message = Some(Cow::Owned(format!("must be one of: {}", allowed.join(", "))));
    Err(err)
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    // chrono accepts unpadded months/days; the wire format does not
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if value.len() != 19 {
        return None;
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}

pub fn client_type(value: &str) -> Result<(), RuleError> {
    one_of(value, CLIENT_TYPES)
}

pub fn consent(value: &str) -> Result<(), RuleError> {
    one_of(value, CONSENT_VALUES)
}

pub fn booking_action(value: &str) -> Result<(), RuleError> {
    one_of(value, BOOKING_ACTIONS)
}

pub fn form_action(value: &str) -> Result<(), RuleError> {
    one_of(value, FORM_ACTIONS)
}

pub fn division(value: &str) -> Result<(), RuleError> {
    one_of(value, DIVISIONS)
}

pub fn area(value: &str) -> Result<(), RuleError> {
    one_of(value, AREAS)
}

pub fn metrics_type(value: &str) -> Result<(), RuleError> {
    one_of(value, METRICS_TYPES)
}

pub fn date(value: &str) -> Result<(), RuleError> {
    if value.is_empty() || parse_date(value).is_some() {
        return Ok(());
    }
    let mut err = RuleError::new("date_format");
    err.message = Some(Cow::Borrowed("must be a date in YYYY-MM-DD format"));
    Err(err)
}

pub fn timestamp(value: &str) -> Result<(), RuleError> {
    if value.is_empty() || parse_timestamp(value).is_some() {
        return Ok(());
    }
    let mut err = RuleError::new("timestamp_format");
    err.message = Some(Cow::Borrowed("must be a timestamp in YYYY-MM-DDTHH:MM:SS format"));
    Err(err)
}

/// One broken rule on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    #[schema(example = "client_type")]
    pub field: String,
    #[schema(example = "one_of")]
    pub rule: String,
    #[schema(example = "must be one of: company, personal")]
    pub message: String,
}

/// A submission failed its field rules. Violations are sorted by field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn has_violation(&self, field: &str, rule: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.rule == rule)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.split_first() {
            None => f.write_str("validation failed"),
            Some((first, rest)) => {
                write!(f, "{}: {}", first.field, first.message)?;
                if !rest.is_empty() {
                    write!(f, " (and {} more)", rest.len())?;
                }
                Ok(())
            }
        }
    }
}

impl From<ValidationErrors> for ValidationError {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = wire_name(field.as_ref());
                errs.iter().map(move |e| FieldViolation {
                    field: field.clone(),
                    rule: e.code.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.rule.cmp(&b.rule)));
        Self { violations }
    }
}
