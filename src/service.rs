use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::conversion_record::{ConversionRecord, NewConversion};
use crate::converter::{ConvertError, Direction};
use crate::store::{DEFAULT_RECENT_LIMIT, HistoryStore};

/// Fraction digits kept in responses and in the `conversions` table.
pub const DISPLAY_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Persisted {
    Saved(ConversionRecord),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum History {
    Recent(Vec<ConversionRecord>),
    Unavailable,
}

impl History {
    pub fn records(&self) -> &[ConversionRecord] {
        match self {
            History::Recent(records) => records,
            History::Unavailable => &[],
        }
    }
}

impl Persisted {
    pub fn record_id(&self) -> Option<i32> {
        match self {
            Persisted::Saved(record) => Some(record.id),
            Persisted::Failed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    pub direction: Direction,
    pub input: Decimal,
    /// Rounded to [`DISPLAY_SCALE`] digits, trailing zeros dropped. This is the value persisted.
    pub value: Decimal,
    pub persisted: Persisted,
    pub history: History,
}

/// Converts, records the conversion and reads back recent history.
///
/// Store failures never fail a conversion: they are logged and surface as
/// [`Persisted::Failed`] or [`History::Unavailable`].
#[derive(Clone)]
pub struct ConversionService {
    store: Arc<dyn HistoryStore>,
}

impl ConversionService {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    pub async fn convert(
        &self,
        direction: Direction,
        raw: &str,
    ) -> Result<ConversionOutcome, ConvertError> {
        let (input, converted) = direction.convert(raw)?;
        let value = converted
            .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .normalize();

        let persisted = match self
            .store
            .append(NewConversion {
                original_value: input,
                converted_value: value,
                conversion_type: direction,
            })
            .await
        {
            Ok(record) => Persisted::Saved(record),
            Err(e) => {
                log::warn!("Error saving conversion ({}): {}", direction, e);
                Persisted::Failed
            }
        };

        Ok(ConversionOutcome {
            direction,
            input,
            value,
            persisted,
            history: self.history().await,
        })
    }

    pub async fn history(&self) -> History {
        match self.store.recent(DEFAULT_RECENT_LIMIT).await {
            Ok(records) => History::Recent(records),
            Err(e) => {
                log::warn!("Error fetching conversions: {}", e);
                History::Unavailable
            }
        }
    }

    pub async fn store_reachable(&self) -> bool {
        self.store.check_connection().await
    }
}
