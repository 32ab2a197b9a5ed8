//! Cart repository for database operations.

use sqlx::PgPool;

use shelf_core::{Cart, CartId, CartItem, ProductId};

use super::RepositoryError;
use super::table::{delete_by_id, fetch_by_id};

/// Repository for carts and their items.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self) -> Result<Cart, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO store.cart DEFAULT VALUES RETURNING id, created_at",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(cart)
    }

    /// Get a cart by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        fetch_by_id::<Cart>(self.pool, id.as_i32()).await
    }

    /// Put a product in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidInput` if `quantity` is not positive.
    /// Returns `RepositoryError::NotFound` if the cart or product does not
    /// exist.
    /// Returns `RepositoryError::Conflict` if the product is already in the
    /// cart.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        if quantity <= 0 {
            return Err(RepositoryError::InvalidInput(format!(
                "quantity must be positive, got {quantity}"
            )));
        }

        let item = sqlx::query_as::<_, CartItem>(
            r"
            INSERT INTO store.cart_item (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, cart_id, product_id, quantity
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::on_insert(e, &format!("product {product_id} already in cart"))
        })?;
        Ok(item)
    }

    /// Items in a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(
            r"
            SELECT id, cart_id, product_id, quantity
            FROM store.cart_item
            WHERE cart_id = $1
            ORDER BY id
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Delete a cart, its items and every tag or like on them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CartId) -> Result<bool, RepositoryError> {
        delete_by_id::<Cart>(self.pool, id.as_i32()).await
    }
}
