//! Inbound submission payloads.
//!
//! Every key is optional on the wire: a missing key decodes to its empty
//! value and is then rejected by the field rules, so a caller always gets
//! the full list of problems instead of the first decode error.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::validation::{self, ValidationError};

/// Vehicle order request from a dealer site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookingSubmission {
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub request_id: String,
    #[validate(
        length(min = 1, code = "required", message = "is required"),
        custom(function = "validation::booking_action")
    )]
    #[schema(example = "bill")]
    pub action_type: String,
    #[validate(range(min = 1, code = "positive", message = "must be greater than zero"))]
    pub uniq_mod_code: i64,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub modification: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub mod_family: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub mod_body_type: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub mod_engine: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub mod_base: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub mod_tuning: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub vin: String,
    /// Price including VAT
    #[validate(range(min = 1, code = "positive", message = "must be greater than zero"))]
    pub price: i64,
    #[validate(
        length(min = 1, code = "required", message = "is required"),
        custom(function = "validation::client_type")
    )]
    #[schema(example = "company")]
    pub client_type: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub inn: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub kpp: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub ogrn: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub reg_address_code: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub delivery_address_code: String,
    pub delivery_address: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub hid: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub client_company_name: String,
    pub representative_name: String,
    pub representative_surname: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub surname: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub client_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub patronymic: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub passport_ser: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub passport_number: String,
    pub snils: String,
    #[validate(
        length(min = 1, code = "required", message = "is required"),
        custom(function = "validation::date")
    )]
    #[schema(example = "1985-06-01")]
    pub date_of_birth: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub client_email: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub client_phone_number: String,
    pub commentary: String,
    #[validate(
        length(min = 1, code = "required", message = "is required"),
        custom(function = "validation::consent")
    )]
    #[schema(example = "yes")]
    pub agreement_mailing: String,
    #[validate(
        length(min = 1, code = "required", message = "is required"),
        custom(function = "validation::timestamp")
    )]
    #[schema(example = "2026-10-18T09:30:00")]
    pub event_datetime: String,
    pub file: String,
    #[serde(rename = "bill_namber", alias = "bill_number")]
    pub bill_number: String,
    pub url_mod: String,
    /// Google Analytics client id
    pub clientid_google: String,
    /// Yandex Metrica client id
    #[serde(rename = "ClientID")]
    pub client_id: String,
    /// Routed to the legacy store's test path when set
    pub testmod: bool,

    // CRM attribution, not stored by the legacy system
    pub subdivisions_id: String,
    pub subdivisions_name: String,
    pub form_name: String,
    pub id_form: String,
    pub host_name: String,
    #[validate(custom(function = "validation::division"))]
    pub division: String,
    #[validate(custom(function = "validation::area"))]
    pub area: String,
    pub brand_name: String,
    pub car_model: String,
    #[validate(custom(function = "validation::metrics_type"))]
    pub metrics_type: String,
    #[serde(rename = "client_IP")]
    pub client_ip: String,
}

/// Marketing lead captured by a site form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct FormSubmission {
    #[validate(custom(function = "validation::timestamp"))]
    pub event_datetime: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub request_id: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub subdivisions_id: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub subdivisions_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub form_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub id_form: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub host_name: String,
    #[validate(custom(function = "validation::division"))]
    pub division: String,
    #[validate(custom(function = "validation::area"))]
    pub area: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub brand_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub car_model: String,
    #[serde(rename = "ClientID")]
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub client_id: String,
    #[validate(
        length(min = 1, code = "required", message = "is required"),
        custom(function = "validation::metrics_type")
    )]
    #[schema(example = "yandex")]
    pub metrics_type: String,
    #[serde(rename = "client_IP")]
    pub client_ip: String,
    #[validate(custom(function = "validation::client_type"))]
    pub client_type: String,
    pub client_company_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub client_name: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub client_email: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub client_phone_number: String,
    pub commentary: String,
    #[validate(custom(function = "validation::consent"))]
    pub agreement_mailing: String,
    #[validate(
        length(min = 1, code = "required", message = "is required"),
        custom(function = "validation::form_action")
    )]
    #[schema(example = "form")]
    pub action_type: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub modification: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub mod_family: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub mod_body_type: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub mod_engine: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub mod_base: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub mod_tuning: String,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub vin: String,
    #[validate(range(min = 1, code = "positive", message = "must be greater than zero"))]
    pub price: i64,
    #[validate(length(min = 1, code = "required", message = "is required"))]
    pub url_mod: String,
}

impl BookingSubmission {
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate().map_err(ValidationError::from)
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        validation::parse_date(&self.date_of_birth)
    }

    pub fn event_time(&self) -> Option<NaiveDateTime> {
        validation::parse_timestamp(&self.event_datetime)
    }
}

impl FormSubmission {
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate().map_err(ValidationError::from)
    }

    pub fn event_time(&self) -> Option<NaiveDateTime> {
        validation::parse_timestamp(&self.event_datetime)
    }
}
