//! Catalog records: products, collections and promotions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CollectionId, Price, ProductId, PromotionId};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Long form description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub inventory: i32,
    /// Collection this product is filed under, if any.
    pub collection_id: Option<CollectionId>,
    /// When the product was last modified.
    pub last_update: DateTime<Utc>,
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Parameters for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub inventory: i32,
    #[serde(default)]
    pub collection_id: Option<CollectionId>,
}

impl NewProduct {
    /// Materialize the product with a primary key and modification time.
    #[must_use]
    pub fn build(self, id: ProductId, last_update: DateTime<Utc>) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            inventory: self.inventory,
            collection_id: self.collection_id,
            last_update,
        }
    }
}

/// A named group of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Collection {
    pub id: CollectionId,
    pub title: String,
    /// Product highlighted on the collection page. Cleared when that product
    /// is deleted.
    pub featured_product_id: Option<ProductId>,
}

/// A promotion that can apply to many products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: PromotionId,
    pub description: String,
    /// Discount as a fraction of the price (0.1 is 10% off).
    pub discount: f64,
}
