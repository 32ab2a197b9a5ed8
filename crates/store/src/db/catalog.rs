//! Catalog repositories: products, collections and promotions.

use chrono::Utc;
use sqlx::PgPool;

use shelf_core::{
    Collection, CollectionId, NewProduct, Product, ProductId, Promotion, PromotionId,
};

use super::RepositoryError;
use super::table::{delete_by_id, fetch_by_id};

const PRODUCT_COLUMNS: &str =
    "id, title, description, price, inventory, collection_id, last_update";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the collection does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO store.product (title, description, price, inventory, collection_id, last_update) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&product.title)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.inventory)
            .bind(product.collection_id)
            .bind(Utc::now())
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::on_insert(e, "product already exists"))?;

        tracing::debug!(product_id = %product.id, title = %product.title, "Created product");
        Ok(product)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        fetch_by_id::<Product>(self.pool, id.as_i32()).await
    }

    /// List products, optionally restricted to one collection, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        collection_id: Option<CollectionId>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.product \
             WHERE $1::INTEGER IS NULL OR collection_id = $1 \
             ORDER BY title, id"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(collection_id)
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// Save the mutable fields of a product and bump `last_update`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product or its collection
    /// does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, product: &Product) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE store.product \
             SET title = $2, description = $3, price = $4, inventory = $5, \
                 collection_id = $6, last_update = $7 \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(product.id)
            .bind(&product.title)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.inventory)
            .bind(product.collection_id)
            .bind(Utc::now())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::on_insert(e, "product already exists"))?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product along with the tags and likes pointing at it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if an order item still refers to
    /// the product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        delete_by_id::<Product>(self.pool, id.as_i32()).await
    }

    /// Attach a promotion to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if either row does not exist.
    /// Returns `RepositoryError::Conflict` if the promotion is already attached.
    pub async fn add_promotion(
        &self,
        product_id: ProductId,
        promotion_id: PromotionId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO store.product_promotion (product_id, promotion_id)
            VALUES ($1, $2)
            ",
        )
        .bind(product_id)
        .bind(promotion_id)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::on_insert(e, "promotion already applied"))?;
        Ok(())
    }

    /// Detach a promotion. Returns `false` if it was not attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_promotion(
        &self,
        product_id: ProductId,
        promotion_id: PromotionId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM store.product_promotion
            WHERE product_id = $1 AND promotion_id = $2
            ",
        )
        .bind(product_id)
        .bind(promotion_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Promotions attached to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn promotions(&self, product_id: ProductId) -> Result<Vec<Promotion>, RepositoryError> {
        let promotions = sqlx::query_as::<_, Promotion>(
            r"
            SELECT p.id, p.description, p.discount
            FROM store.promotion p
            JOIN store.product_promotion pp ON pp.promotion_id = p.id
            WHERE pp.product_id = $1
            ORDER BY p.id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(promotions)
    }
}

/// Repository for collection database operations.
pub struct CollectionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CollectionRepository<'a> {
    /// Create a new collection repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a collection with no featured product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, title: &str) -> Result<Collection, RepositoryError> {
        let collection = sqlx::query_as::<_, Collection>(
            r"
            INSERT INTO store.collection (title)
            VALUES ($1)
            RETURNING id, title, featured_product_id
            ",
        )
        .bind(title)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(collection_id = %collection.id, "Created collection");
        Ok(collection)
    }

    /// Get a collection by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CollectionId) -> Result<Option<Collection>, RepositoryError> {
        fetch_by_id::<Collection>(self.pool, id.as_i32()).await
    }

    /// All collections ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Collection>, RepositoryError> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT id, title, featured_product_id FROM store.collection ORDER BY title, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(collections)
    }

    /// Set or clear the featured product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the collection or product does
    /// not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_featured_product(
        &self,
        id: CollectionId,
        product_id: Option<ProductId>,
    ) -> Result<Collection, RepositoryError> {
        sqlx::query_as::<_, Collection>(
            r"
            UPDATE store.collection
            SET featured_product_id = $2
            WHERE id = $1
            RETURNING id, title, featured_product_id
            ",
        )
        .bind(id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::on_insert(e, "collection already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a collection along with the tags and likes pointing at it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if products still belong to it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CollectionId) -> Result<bool, RepositoryError> {
        delete_by_id::<Collection>(self.pool, id.as_i32()).await
    }
}

/// Repository for promotion database operations.
pub struct PromotionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromotionRepository<'a> {
    /// Create a new promotion repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidInput` if `discount` is not a finite
    /// number.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        description: &str,
        discount: f64,
    ) -> Result<Promotion, RepositoryError> {
        if !discount.is_finite() {
            return Err(RepositoryError::InvalidInput(format!(
                "discount must be finite, got {discount}"
            )));
        }

        let promotion = sqlx::query_as::<_, Promotion>(
            r"
            INSERT INTO store.promotion (description, discount)
            VALUES ($1, $2)
            RETURNING id, description, discount
            ",
        )
        .bind(description)
        .bind(discount)
        .fetch_one(self.pool)
        .await?;
        Ok(promotion)
    }

    /// Get a promotion by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PromotionId) -> Result<Option<Promotion>, RepositoryError> {
        fetch_by_id::<Promotion>(self.pool, id.as_i32()).await
    }

    /// Delete a promotion and detach it from every product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: PromotionId) -> Result<bool, RepositoryError> {
        delete_by_id::<Promotion>(self.pool, id.as_i32()).await
    }
}
