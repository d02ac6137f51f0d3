use std::{future::Future, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};

use super::{HistoryStore, StoreError};
use crate::config::StoreConfig;
use crate::conversion_record::{ConversionRecord, NewConversion};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS conversions (
    id SERIAL PRIMARY KEY,
    original_value DECIMAL(10,2) NOT NULL,
    converted_value DECIMAL(10,2) NOT NULL,
    conversion_type VARCHAR(50) NOT NULL,
    timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const INSERT: &str = r#"
INSERT INTO conversions (original_value, converted_value, conversion_type)
VALUES ($1, $2, $3)
RETURNING id, original_value, converted_value, conversion_type, timestamp
"#;

const SELECT_RECENT: &str = r#"
SELECT id, original_value, converted_value, conversion_type, timestamp
FROM conversions
ORDER BY timestamp DESC, id DESC
LIMIT $1
"#;

#[derive(Debug, sqlx::FromRow)]
struct ConversionRow {
    id: i32,
    original_value: Decimal,
    converted_value: Decimal,
    conversion_type: String,
    timestamp: NaiveDateTime,
}

impl TryFrom<ConversionRow> for ConversionRecord {
    type Error = StoreError;

    fn try_from(row: ConversionRow) -> Result<Self, Self::Error> {
        let conversion_type = row
            .conversion_type
            .parse()
            .map_err(|e: crate::converter::ConvertError| StoreError::CorruptRecord {
                id: row.id,
                reason: e.to_string(),
            })?;

        Ok(ConversionRecord {
            id: row.id,
            original_value: row.original_value,
            converted_value: row.converted_value,
            conversion_type,
            timestamp: row.timestamp,
        })
    }
}

/// History store backed by the `conversions` table.
///
/// Connections are borrowed from the pool per query and returned when the
/// query future completes or is dropped, so a timed out operation does not
/// leak a connection.
#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgHistoryStore {
    /// Builds the pool without connecting; the first query opens a connection.
    pub fn connect_lazy(config: &StoreConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.timeout)
            .connect_lazy_with(options);

        Self {
            pool,
            timeout: config.timeout,
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn bounded<T, F>(&self, operation: &'static str, query: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout {
                operation,
                after: self.timeout,
            }),
        }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.bounded("initialize", sqlx::query(CREATE_TABLE).execute(&self.pool))
            .await?;
        log::info!("Conversions table created/verified");
        Ok(())
    }

    async fn append(&self, record: NewConversion) -> Result<ConversionRecord, StoreError> {
        let row = self
            .bounded(
                "append",
                sqlx::query_as::<_, ConversionRow>(INSERT)
                    .bind(record.original_value)
                    .bind(record.converted_value)
                    .bind(record.conversion_type.label())
                    .fetch_one(&self.pool),
            )
            .await?;

        row.try_into()
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ConversionRecord>, StoreError> {
        if limit <= 0 {
            return Ok(Vec::new());
        }

        let rows = self
            .bounded(
                "recent",
                sqlx::query_as::<_, ConversionRow>(SELECT_RECENT)
                    .bind(limit)
                    .fetch_all(&self.pool),
            )
            .await?;

        rows.into_iter().map(ConversionRecord::try_from).collect()
    }

    async fn check_connection(&self) -> bool {
        match self
            .bounded("check_connection", sqlx::query("SELECT 1").execute(&self.pool))
            .await
        {
            Ok(_) => {
                log::info!("PostgreSQL connection established");
                true
            }
            Err(e) => {
                log::error!("Error connecting to PostgreSQL: {}", e);
                false
            }
        }
    }
}


#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;
    use crate::converter::Direction;
    use rust_decimal_macros::dec;
    use testcontainers_modules::{
        postgres::Postgres,
        testcontainers::{ContainerAsync, runners::AsyncRunner},
    };

    async fn bring_up_postgres() -> (ContainerAsync<Postgres>, PgHistoryStore) {
        let container = Postgres::default().start().await.unwrap();
        let port = container.get_host_port_ipv4(5432).await.unwrap();

        let store = PgHistoryStore::connect_lazy(&StoreConfig {
            host: "127.0.0.1".to_owned(),
            port,
            database: "postgres".to_owned(),
            user: "postgres".to_owned(),
            password: "postgres".to_owned(),
            max_connections: 4,
            timeout: Duration::from_secs(20),
        });

        (container, store)
    }

    fn celsius(value: Decimal) -> NewConversion {
        NewConversion {
            original_value: value,
            converted_value: value * dec!(9) / dec!(5) + dec!(32),
            conversion_type: Direction::CelsiusToFahrenheit,
        }
    }

    #[tokio::test]
    async fn conversions_table_round_trip() {
        let (_container, store) = bring_up_postgres().await;

        store.initialize().await.unwrap();
        store.initialize().await.unwrap();
        assert!(store.check_connection().await);
        assert!(store.recent(10).await.unwrap().is_empty());

        let first = store
            .append(NewConversion {
                original_value: dec!(131),
                converted_value: dec!(55),
                conversion_type: Direction::FahrenheitToCelsius,
            })
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.original_value, dec!(131));
        assert_eq!(first.converted_value, dec!(55));
        assert_eq!(first.conversion_type, Direction::FahrenheitToCelsius);

        let mut previous = first.clone();
        for c in 1..12 {
            let record = store.append(celsius(Decimal::from(c))).await.unwrap();
            assert!(record.id > previous.id);
            assert!(record.timestamp >= previous.timestamp);
            previous = record;
        }

        let recent = store.recent(10).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|r| r.id).collect();
        assert_eq!(ids, (3..=12).rev().collect::<Vec<_>>());
        assert_eq!(recent[0].original_value, dec!(11));
        assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

        let half = store.append(celsius(dec!(0.125))).await.unwrap();
        assert_eq!(half.original_value, dec!(0.13));

        let err = store
            .append(celsius(dec!(1000000000)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)), "{err:?}");

        store.close().await;
    }
}
