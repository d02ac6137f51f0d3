use std::{env, path::Path, str::FromStr, time::Duration};

#[derive(Debug, thiserror::Error)]
#[error("invalid value {value:?} for {name}")]
pub struct ConfigError {
    name: &'static str,
    value: String,
}

/// Loads `path`, or `.env` from the working directory, into the process
/// environment. A missing file is not an error. Call before the logger is
/// built so a `RUST_LOG` set in the file takes effect.
pub fn load_env_file(path: Option<&Path>) -> Result<(), dotenvy::Error> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };

    match loaded {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}

/// Connection parameters handed to the history store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    /// Upper bound for every store operation, pool acquisition included.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let text = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_owned());

        Ok(Self {
            port: parsed(&lookup, "PORT", 8080)?,
            store: StoreConfig {
                host: text("DB_HOST", "localhost"),
                port: parsed(&lookup, "DB_PORT", 5432)?,
                database: text("DB_DATABASE", "temperature_db"),
                user: text("DB_USERNAME", "user"),
                password: text("DB_PASSWORD", "password123"),
                max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", 10)?,
                timeout: Duration::from_millis(parsed(&lookup, "DB_TIMEOUT_MS", 5000)?),
            },
        })
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError { name, value }),
    }
}
