//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Schemas and tables
//!
//! - `store` - `product`, `collection`, `promotion`, `product_promotion`,
//!   `customer`, `address`, `"order"`, `order_item`, `cart`, `cart_item`
//! - `auth` - `"user"`
//! - `tags` - `tag`, `tagged_item`
//! - `likes` - `liked_item`
//!
//! `tags.tagged_item` and `likes.liked_item` reference their target through a
//! `(content_type, object_id)` pair with no foreign key. Deleting a record
//! through one of the repositories below removes those rows in the same
//! transaction.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/store/migrations/` and run via:
//! ```bash
//! cargo run -p shelf-cli -- migrate
//! ```

pub mod carts;
pub mod catalog;
pub mod customers;
pub mod orders;
pub mod relations;
pub mod table;
pub mod users;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::config::StoreConfig;

pub use carts::CartRepository;
pub use catalog::{CollectionRepository, ProductRepository, PromotionRepository};
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use relations::PgRelations;
pub use table::{PgRecord, PgTable, registry};
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, duplicate like).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Input rejected before reaching the database.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RepositoryError {
    /// Map a write error, turning unique and foreign key violations into
    /// [`RepositoryError::Conflict`] with the given message.
    pub(crate) fn on_conflict(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(err)
    }

    /// Map an insert error where a foreign key violation means the referenced
    /// owner row does not exist.
    pub(crate) fn on_insert(err: sqlx::Error, duplicate: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_foreign_key_violation() {
                return Self::NotFound;
            }
            if db_err.is_unique_violation() {
                return Self::Conflict(duplicate.to_owned());
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool from configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &StoreConfig) -> Result<PgPool, sqlx::Error> {
    use secrecy::ExposeSecret;

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(config.database_url.expose_secret())
        .await
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running store migrations");
    MIGRATOR.run(pool).await?;
    tracing::info!("Store migrations complete");
    Ok(())
}
