use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::converter::Direction;

/// A persisted conversion. Records are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRecord {
    pub id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub converted_value: Decimal,
    pub conversion_type: Direction,
    pub timestamp: NaiveDateTime,
}

/// Fields supplied by the caller; `id` and `timestamp` are assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewConversion {
    pub original_value: Decimal,
    pub converted_value: Decimal,
    pub conversion_type: Direction,
}
