use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::conversion_record::ConversionRecord;
use crate::converter::{ConvertError, Direction};
use crate::service::ConversionOutcome;

/// Body of `POST /`.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ConversionForm {
    #[serde(rename = "valueRef")]
    pub value_ref: Option<String>,
    #[serde(rename = "selectTemp")]
    pub select_temp: Option<String>,
}

impl ConversionForm {
    /// The value to convert, or `None` when the field was left blank.
    pub fn value(&self) -> Option<&str> {
        self.value_ref
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    /// `"1"` selects Celsius to Fahrenheit; `"2"` or no selector selects Fahrenheit to Celsius.
    pub fn direction(&self) -> Result<Direction, ConvertError> {
        match self.select_temp.as_deref().map(str::trim) {
            Some("1") => Ok(Direction::CelsiusToFahrenheit),
            Some("2") | Some("") | None => Ok(Direction::FahrenheitToCelsius),
            Some(other) => Err(ConvertError::UnknownDirection {
                selector: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServerInfo {
    pub machine: String,
    pub pkgversion: &'static str,
}

impl ServerInfo {
    pub fn detect() -> Self {
        let machine = match hostname::get() {
            Ok(name) => name.to_string_lossy().into_owned(),
            Err(e) => {
                log::warn!("Can't read hostname: {}", e);
                "unknown".to_owned()
            }
        };

        Self {
            machine,
            pkgversion: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversionResponse<'a> {
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub celsius: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub fahrenheit: Option<Decimal>,
    /// Id of the stored record; absent when persisting failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub history: &'a [ConversionRecord],
    #[serde(flatten)]
    pub server: &'a ServerInfo,
}

impl<'a> ConversionResponse<'a> {
    pub fn new(outcome: &'a ConversionOutcome, server: &'a ServerInfo) -> Self {
        let (celsius, fahrenheit) = match outcome.direction {
            Direction::FahrenheitToCelsius => (Some(outcome.value), None),
            Direction::CelsiusToFahrenheit => (None, Some(outcome.value)),
        };

        Self {
            celsius,
            fahrenheit,
            id: outcome.persisted.record_id(),
            history: outcome.history.records(),
            server,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub status: &'static str,
    pub database: bool,
    #[serde(flatten)]
    pub server: &'a ServerInfo,
}
