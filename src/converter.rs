use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::Serialize;

const FREEZING_POINT_F: Decimal = Decimal::from_parts(32, 0, 0, false, 0);
const NINE: Decimal = Decimal::from_parts(9, 0, 0, false, 0);
const FIVE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("{input:?} is not a decimal number")]
    InvalidInput { input: String },

    #[error("{input} is out of range")]
    OutOfRange { input: String },

    #[error("unknown conversion direction {selector:?}")]
    UnknownDirection { selector: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    #[serde(rename = "Celsius to Fahrenheit")]
    CelsiusToFahrenheit,
    #[serde(rename = "Fahrenheit to Celsius")]
    FahrenheitToCelsius,
}

impl Direction {
    /// Label stored in the `conversion_type` column.
    pub fn label(self) -> &'static str {
        match self {
            Direction::CelsiusToFahrenheit => "Celsius to Fahrenheit",
            Direction::FahrenheitToCelsius => "Fahrenheit to Celsius",
        }
    }

    pub fn apply(self, value: Decimal) -> Result<Decimal, ConvertError> {
        match self {
            Direction::CelsiusToFahrenheit => celsius_to_fahrenheit(value),
            Direction::FahrenheitToCelsius => fahrenheit_to_celsius(value),
        }
    }

    /// Parses `raw` and converts it in this direction.
    pub fn convert(self, raw: &str) -> Result<(Decimal, Decimal), ConvertError> {
        let input = parse_temperature(raw)?;
        let output = self.apply(input)?;
        Ok((input, output))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Celsius to Fahrenheit" => Ok(Direction::CelsiusToFahrenheit),
            "Fahrenheit to Celsius" => Ok(Direction::FahrenheitToCelsius),
            other => Err(ConvertError::UnknownDirection {
                selector: other.to_owned(),
            }),
        }
    }
}

/// Accepts an optional sign, digits and at most one decimal point.
/// Anything else, including `NaN`, `Infinity` and exponents, is rejected.
pub fn parse_temperature(raw: &str) -> Result<Decimal, ConvertError> {
    let invalid = || ConvertError::InvalidInput {
        input: raw.to_owned(),
    };

    let trimmed = raw.trim();
    let unsigned = trimmed
        .strip_prefix(['-', '+'])
        .unwrap_or(trimmed);

    let mut digits = 0;
    let mut points = 0;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return Err(invalid()),
        }
    }
    if digits == 0 || points > 1 {
        return Err(invalid());
    }

    let negative = trimmed.starts_with('-');
    let mut normalized = String::with_capacity(unsigned.len() + 3);
    if negative {
        normalized.push('-');
    }
    if unsigned.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(unsigned.strip_suffix('.').unwrap_or(unsigned));

    // The text is a well-formed decimal at this point, so a failure means it
    // does not fit in 96 bits.
    Decimal::from_str(&normalized).map_err(|_| ConvertError::OutOfRange {
        input: trimmed.to_owned(),
    })
}

pub fn celsius_to_fahrenheit(value: Decimal) -> Result<Decimal, ConvertError> {
    value
        .checked_mul(NINE)
        .and_then(|v| v.checked_div(FIVE))
        .and_then(|v| v.checked_add(FREEZING_POINT_F))
        .ok_or_else(|| out_of_range(value))
}

pub fn fahrenheit_to_celsius(value: Decimal) -> Result<Decimal, ConvertError> {
    value
        .checked_sub(FREEZING_POINT_F)
        .and_then(|v| v.checked_mul(FIVE))
        .and_then(|v| v.checked_div(NINE))
        .ok_or_else(|| out_of_range(value))
}

fn out_of_range(value: Decimal) -> ConvertError {
    ConvertError::OutOfRange {
        input: value.to_string(),
    }
}
