//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHELF_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `SHELF_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `SHELF_DB_MIN_CONNECTIONS` - Idle connections kept open (default: 1)
//! - `SHELF_DB_ACQUIRE_TIMEOUT_SECS` - Seconds to wait for a connection (default: 10)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DATABASE_URL_VAR: &str = "SHELF_DATABASE_URL";
const MAX_CONNECTIONS_VAR: &str = "SHELF_DB_MAX_CONNECTIONS";
const MIN_CONNECTIONS_VAR: &str = "SHELF_DB_MIN_CONNECTIONS";
const ACQUIRE_TIMEOUT_VAR: &str = "SHELF_DB_ACQUIRE_TIMEOUT_SECS";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Database configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Minimum number of idle connections
    pub min_connections: u32,
    /// How long to wait for a free connection
    pub acquire_timeout: Duration,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database URL is missing or a numeric
    /// setting does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StoreConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_VAR)
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(DATABASE_URL_VAR.to_string()))?;

        let max_connections = parse_or_default(&lookup, MAX_CONNECTIONS_VAR, 10)?;
        let min_connections = parse_or_default(&lookup, MIN_CONNECTIONS_VAR, 1)?;
        let acquire_timeout = parse_or_default(&lookup, ACQUIRE_TIMEOUT_VAR, 10)?;

        if min_connections > max_connections {
            return Err(ConfigError::InvalidEnvVar(
                MIN_CONNECTIONS_VAR.to_string(),
                format!("must not exceed {MAX_CONNECTIONS_VAR} ({max_connections})"),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            min_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout),
        })
    }
}

/// Parse an optional numeric variable, falling back to `default` when unset.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
