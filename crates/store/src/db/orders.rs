//! Order repository for database operations.

use sqlx::PgPool;

use shelf_core::{CustomerId, Order, OrderId, OrderItem, PaymentStatus, Price, ProductId};

use super::RepositoryError;
use super::table::{delete_by_id, fetch_by_id};

/// Repository for orders and their items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for a customer.
    ///
    /// `placed_at` is set by the database and the payment status starts as
    /// [`PaymentStatus::Failed`] unless given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO store."order" (customer_id, payment_status)
            VALUES ($1, COALESCE($2, 'failed'::store.payment_status))
            RETURNING id, customer_id, placed_at, payment_status
            "#,
        )
        .bind(customer_id)
        .bind(payment_status)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_insert(e, "order already exists"))?;

        tracing::info!(
            order_id = %order.id,
            customer_id = %customer_id,
            payment_status = %order.payment_status,
            "Placed order"
        );
        Ok(order)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        fetch_by_id::<Order>(self.pool, id.as_i32()).await
    }

    /// Orders of one customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_id, placed_at, payment_status
            FROM store."order"
            WHERE customer_id = $1
            ORDER BY placed_at DESC, id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// Update the payment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_payment_status(
        &self,
        id: OrderId,
        payment_status: PaymentStatus,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE store."order"
            SET payment_status = $2
            WHERE id = $1
            RETURNING id, customer_id, placed_at, payment_status
            "#,
        )
        .bind(id)
        .bind(payment_status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tracing::info!(order_id = %id, %payment_status, "Updated payment status");
        Ok(order)
    }

    /// Add a line item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidInput` if `quantity` is not positive.
    /// Returns `RepositoryError::NotFound` if the order or product does not
    /// exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        unit_price: Price,
    ) -> Result<OrderItem, RepositoryError> {
        if quantity <= 0 {
            return Err(RepositoryError::InvalidInput(format!(
                "quantity must be positive, got {quantity}"
            )));
        }

        let item = sqlx::query_as::<_, OrderItem>(
            r"
            INSERT INTO store.order_item (order_id, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, product_id, quantity, unit_price
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_insert(e, "order item already exists"))?;
        Ok(item)
    }

    /// Line items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM store.order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Delete an order, its items and every tag or like on them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        delete_by_id::<Order>(self.pool, id.as_i32()).await
    }
}
