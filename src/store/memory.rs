use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use rust_decimal::RoundingStrategy;

use super::{HistoryStore, StoreError};
use crate::conversion_record::{ConversionRecord, NewConversion};

/// In-process stand-in for the Postgres store. `set_available(false)`
/// simulates a dead backend: every operation then fails with a timeout.
#[derive(Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<ConversionRecord>>,
    unavailable: AtomicBool,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        let store = Self::default();
        store.set_available(false);
        store
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn ensure_available(&self, operation: &'static str) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout {
                operation,
                after: std::time::Duration::ZERO,
            });
        }
        Ok(())
    }
}

/// Rounds the way a Postgres `DECIMAL(10,2)` column does.
fn numeric_10_2(value: rust_decimal::Decimal) -> rust_decimal::Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.ensure_available("initialize")
    }

    async fn append(&self, record: NewConversion) -> Result<ConversionRecord, StoreError> {
        self.ensure_available("append")?;

        let mut records = self.records.lock().unwrap();
        let now = Utc::now().naive_utc();
        let timestamp: NaiveDateTime = match records.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        let stored = ConversionRecord {
            id: records.len() as i32 + 1,
            original_value: numeric_10_2(record.original_value),
            converted_value: numeric_10_2(record.converted_value),
            conversion_type: record.conversion_type,
            timestamp,
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ConversionRecord>, StoreError> {
        self.ensure_available("recent")?;

        let records = self.records.lock().unwrap();
        let mut newest_first: Vec<_> = records.iter().rev().cloned().collect();
        newest_first.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        newest_first.truncate(limit.max(0) as usize);
        Ok(newest_first)
    }

    async fn check_connection(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::Direction;
    use crate::store::DEFAULT_RECENT_LIMIT;
    use rust_decimal::Decimal;

    fn conversion(value: i64) -> NewConversion {
        NewConversion {
            original_value: Decimal::from(value),
            converted_value: Decimal::from(value * 2),
            conversion_type: Direction::CelsiusToFahrenheit,
        }
    }

    #[tokio::test]
    async fn empty_store_has_empty_history() {
        let store = MemoryHistoryStore::new();
        store.initialize().await.unwrap();
        assert!(store.recent(DEFAULT_RECENT_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_is_bounded_and_newest_first() {
        for n in [3_i64, 10, 14] {
            let store = MemoryHistoryStore::new();
            let mut ids = Vec::new();
            for value in 0..n {
                ids.push(store.append(conversion(value)).await.unwrap().id);
            }
            assert!(ids.windows(2).all(|w| w[0] < w[1]));

            let recent = store.recent(DEFAULT_RECENT_LIMIT).await.unwrap();
            assert_eq!(recent.len(), n.min(10) as usize);
            assert_eq!(recent[0].original_value, Decimal::from(n - 1));
            assert!(recent.windows(2).all(|w| w[0].id > w[1].id));
            assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        }
    }

    #[tokio::test]
    async fn stored_values_round_half_away_from_zero() {
        let store = MemoryHistoryStore::new();
        let stored = store
            .append(NewConversion {
                original_value: Decimal::new(125, 3),
                converted_value: Decimal::new(-125, 3),
                conversion_type: Direction::FahrenheitToCelsius,
            })
            .await
            .unwrap();

        assert_eq!(stored.original_value, Decimal::new(13, 2));
        assert_eq!(stored.converted_value, Decimal::new(-13, 2));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_operation() {
        let store = MemoryHistoryStore::unavailable();
        assert!(store.initialize().await.is_err());
        assert!(store.append(conversion(1)).await.is_err());
        assert!(store.recent(10).await.is_err());
        assert!(!store.check_connection().await);
        assert_eq!(store.len(), 0);
    }
}
