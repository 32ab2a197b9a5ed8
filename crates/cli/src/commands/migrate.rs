//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shelf-cli migrate
//! ```
//!
//! Migrations live in `crates/store/migrations/` and are embedded in the
//! binary at build time.

use super::connect;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the configuration is missing, the database cannot be
/// reached, or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    shelf_store::db::migrate(&pool).await?;
    Ok(())
}
