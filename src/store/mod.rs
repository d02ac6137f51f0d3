use std::time::Duration;

use async_trait::async_trait;

use crate::conversion_record::{ConversionRecord, NewConversion};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgHistoryStore;

pub const DEFAULT_RECENT_LIMIT: i64 = 10;

/// Every variant means the backend could not serve the request.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("corrupt record {id}: {reason}")]
    CorruptRecord { id: i32, reason: String },
}

/// Append-only log of conversions with a bounded-recency read.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Creates the record collection if it does not exist yet. Safe to call on every start.
    async fn initialize(&self) -> Result<(), StoreError>;

    async fn append(&self, record: NewConversion) -> Result<ConversionRecord, StoreError>;

    /// Up to `limit` records, newest first (timestamp, then id, descending).
    async fn recent(&self, limit: i64) -> Result<Vec<ConversionRecord>, StoreError>;

    /// Diagnostic probe; never fails.
    async fn check_connection(&self) -> bool;
}
