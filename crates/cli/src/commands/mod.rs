//! Subcommand implementations.

pub mod migrate;
pub mod relations;
pub mod resolve;
pub mod seed;

use shelf_store::StoreConfig;
use sqlx::PgPool;

/// Load configuration from the environment and connect to the database.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = StoreConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = shelf_store::db::create_pool(&config).await?;
    Ok(pool)
}
