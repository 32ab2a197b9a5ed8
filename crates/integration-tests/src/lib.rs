//! Integration tests for Shelf.
//!
//! # Running Tests
//!
//! ```bash
//! # Point the tests at a scratch database
//! export SHELF_DATABASE_URL=postgres://localhost/shelf_test
//!
//! # Run everything, including the database tests
//! cargo test -p shelf-integration-tests -- --include-ignored
//! ```
//!
//! Database tests are `#[ignore]`d by default. They run the migrations on
//! first connect and use unique names so they can share one database.

use shelf_core::{Email, NewCustomer, NewProduct, Price};
use shelf_store::StoreConfig;
use sqlx::PgPool;
use tokio::sync::OnceCell;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connect using `SHELF_DATABASE_URL` and make sure the schema is current.
///
/// # Panics
///
/// Panics if the database is not configured or unreachable.
#[allow(clippy::expect_used)]
pub async fn test_pool() -> PgPool {
    let config = StoreConfig::from_env().expect("SHELF_DATABASE_URL must be set");
    let pool = shelf_store::db::create_pool(&config)
        .await
        .expect("Failed to connect to test database");

    MIGRATED
        .get_or_init(|| async {
            shelf_store::db::migrate(&pool)
                .await
                .expect("Failed to run migrations");
        })
        .await;

    pool
}

/// A name nobody else in the database is using.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

/// A customer with a unique email and default membership.
///
/// # Panics
///
/// Never in practice; the generated email is always valid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn new_customer() -> NewCustomer {
    let email = Email::parse(&format!("{}@example.com", unique("customer")))
        .expect("generated email is valid");
    NewCustomer::new("Test", "Customer", email, "")
}

/// A product with a unique title.
///
/// # Panics
///
/// Never in practice; the price is in range.
#[must_use]
#[allow(clippy::expect_used)]
pub fn new_product(price_cents: i64) -> NewProduct {
    NewProduct {
        title: unique("product"),
        description: String::new(),
        price: Price::from_cents(price_cents).expect("price in range"),
        inventory: 5,
        collection_id: None,
    }
}
