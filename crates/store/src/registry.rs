//! Mapping from content types to the tables that can load them.
//!
//! The registry is built once, before the first reference is resolved, and is
//! read-only afterwards. Which content types are registered decides which
//! records can be tagged or liked: references to anything else never resolve.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use shelf_core::{ContentType, Entity, Model};

use crate::db::RepositoryError;

/// Loads records of one content type by primary key.
#[async_trait]
pub trait TargetTable: Send + Sync {
    /// Fetch the record with `object_id`, or `None` if there is no such row.
    async fn fetch(&self, object_id: i32) -> Result<Option<Entity>, RepositoryError>;
}

/// Immutable mapping from [`ContentType`] to a [`TargetTable`].
#[derive(Clone, Default)]
pub struct TypeRegistry {
    tables: HashMap<ContentType, Arc<dyn TargetTable>>,
}

impl TypeRegistry {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// The table registered for `content_type`.
    #[must_use]
    pub fn get(&self, content_type: &ContentType) -> Option<&Arc<dyn TargetTable>> {
        self.tables.get(content_type)
    }

    /// Whether `content_type` has a table.
    #[must_use]
    pub fn contains(&self, content_type: &ContentType) -> bool {
        self.tables.contains_key(content_type)
    }

    /// Registered content types in sorted order.
    #[must_use]
    pub fn content_types(&self) -> Vec<&ContentType> {
        let mut types: Vec<_> = self.tables.keys().collect();
        types.sort();
        types
    }

    /// Number of registered content types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("content_types", &self.content_types())
            .finish()
    }
}

/// Builder for [`TypeRegistry`].
#[derive(Default)]
pub struct TypeRegistryBuilder {
    tables: HashMap<ContentType, Arc<dyn TargetTable>>,
}

impl TypeRegistryBuilder {
    /// Register `table` as the source of `content_type` records.
    ///
    /// Registering the same content type twice keeps the last table.
    #[must_use]
    pub fn register(mut self, content_type: ContentType, table: impl TargetTable + 'static) -> Self {
        if self
            .tables
            .insert(content_type.clone(), Arc::new(table))
            .is_some()
        {
            tracing::warn!(%content_type, "Replaced registered table");
        }
        self
    }

    /// Register `table` for the content type of `M`.
    #[must_use]
    pub fn register_model<M: Model>(self, table: impl TargetTable + 'static) -> Self {
        self.register(M::CONTENT_TYPE, table)
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> TypeRegistry {
        tracing::debug!(content_types = self.tables.len(), "Built type registry");
        TypeRegistry {
            tables: self.tables,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shelf_core::{Cart, CartId, Product};

    use super::*;

    struct EmptyTable;

    #[async_trait]
    impl TargetTable for EmptyTable {
        async fn fetch(&self, _object_id: i32) -> Result<Option<Entity>, RepositoryError> {
            Ok(None)
        }
    }

    struct FixedCart;

    #[async_trait]
    impl TargetTable for FixedCart {
        async fn fetch(&self, object_id: i32) -> Result<Option<Entity>, RepositoryError> {
            Ok(Some(Entity::Cart(Cart {
                id: CartId::new(object_id),
                created_at: chrono::Utc::now(),
            })))
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = TypeRegistry::builder()
            .register_model::<Product>(EmptyTable)
            .register(Cart::CONTENT_TYPE, FixedCart)
            .build();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&"store.product".parse().unwrap()));
        assert!(!registry.contains(&"store.order".parse().unwrap()));
        assert_eq!(
            registry
                .content_types()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["store.cart", "store.product"]
        );
    }

    #[tokio::test]
    async fn test_registered_table_is_used() {
        let registry = TypeRegistry::builder()
            .register(Cart::CONTENT_TYPE, EmptyTable)
            .register(Cart::CONTENT_TYPE, FixedCart)
            .build();

        let table = registry.get(&Cart::CONTENT_TYPE).unwrap();
        let cart = table.fetch(5).await.unwrap().unwrap();
        assert_eq!(cart.pk(), 5);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(TypeRegistry::default().is_empty());
    }
}
