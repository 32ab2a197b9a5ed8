//! Customer repository for database operations.

use sqlx::PgPool;

use shelf_core::{Address, Customer, CustomerId, Email, NewCustomer};

use super::RepositoryError;
use super::table::{delete_by_id, fetch_by_id};

const CUSTOMER_COLUMNS: &str =
    "id, first_name, last_name, email, phone, birth_date, membership";

/// Repository for customers and their address.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        let sql = format!(
            "INSERT INTO store.customer (first_name, last_name, email, phone, birth_date, membership) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CUSTOMER_COLUMNS}"
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(&customer.first_name)
            .bind(&customer.last_name)
            .bind(&customer.email)
            .bind(&customer.phone)
            .bind(customer.birth_date)
            .bind(customer.membership)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::on_conflict(e, "email already exists"))?;

        tracing::info!(customer_id = %customer.id, membership = %customer.membership, "Created customer");
        Ok(customer)
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or the stored
    /// email does not parse.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        fetch_by_id::<Customer>(self.pool, id.as_i32()).await
    }

    /// Get a customer by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM store.customer WHERE email = $1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(customer)
    }

    /// Delete a customer, their address and every tag or like on either.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the customer still has orders.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        delete_by_id::<Customer>(self.pool, id.as_i32()).await
    }

    /// Set the customer's address, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_address(
        &self,
        customer_id: CustomerId,
        street: &str,
        city: &str,
    ) -> Result<Address, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            INSERT INTO store.address (customer_id, street, city)
            VALUES ($1, $2, $3)
            ON CONFLICT (customer_id)
            DO UPDATE SET street = EXCLUDED.street, city = EXCLUDED.city
            RETURNING id, customer_id, street, city
            ",
        )
        .bind(customer_id)
        .bind(street)
        .bind(city)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_insert(e, "address already exists"))?;
        Ok(address)
    }

    /// Get the customer's address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn address(&self, customer_id: CustomerId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            SELECT id, customer_id, street, city
            FROM store.address
            WHERE customer_id = $1
            ",
        )
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }
}
