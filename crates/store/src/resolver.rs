//! Dereferencing generic object references.

use std::sync::Arc;

use thiserror::Error;

use shelf_core::{ContentType, Entity, ObjectRef};

use crate::db::RepositoryError;
use crate::registry::TypeRegistry;

/// Errors that can occur when resolving or building a reference.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The reference does not point at a live row. Covers unknown content
    /// types, ids that never existed and rows deleted since the reference
    /// was created.
    #[error("{0} not found")]
    NotFound(ObjectRef),

    /// A reference was requested for a record type with no registered table.
    #[error("content type {0} is not registered")]
    UnregisteredType(ContentType),

    /// The backing store failed.
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Resolves [`ObjectRef`]s through a [`TypeRegistry`].
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<TypeRegistry>,
}

impl Resolver {
    #[must_use]
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Whether records of `content_type` can be referenced.
    #[must_use]
    pub fn is_registered(&self, content_type: &ContentType) -> bool {
        self.registry.contains(content_type)
    }

    /// Load the record `target` points at.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if the content type is not
    /// registered or the row does not exist, and [`ResolveError::Storage`]
    /// if the table lookup fails.
    pub async fn resolve(&self, target: &ObjectRef) -> Result<Entity, ResolveError> {
        let Some(table) = self.registry.get(&target.content_type) else {
            tracing::debug!(%target, "Unknown content type");
            return Err(ResolveError::NotFound(target.clone()));
        };

        table
            .fetch(target.object_id)
            .await?
            .ok_or_else(|| ResolveError::NotFound(target.clone()))
    }

    /// Build a reference to `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnregisteredType`] if the entity's content type
    /// has no registered table.
    pub fn build_reference(&self, entity: &Entity) -> Result<ObjectRef, ResolveError> {
        let content_type = entity.content_type();
        if !self.registry.contains(&content_type) {
            return Err(ResolveError::UnregisteredType(content_type));
        }
        Ok(ObjectRef::new(content_type, entity.pk()))
    }

    /// Resolve many references, skipping the ones that no longer resolve.
    ///
    /// Dangling references are logged and left out of the result; order is
    /// preserved for the rest.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Storage`] on the first storage failure.
    pub async fn resolve_live<'a, I>(&self, targets: I) -> Result<Vec<Entity>, ResolveError>
    where
        I: IntoIterator<Item = &'a ObjectRef>,
    {
        let mut live = Vec::new();
        for target in targets {
            match self.resolve(target).await {
                Ok(entity) => live.push(entity),
                Err(ResolveError::NotFound(missing)) => {
                    tracing::warn!(target = %missing, "Skipping dangling reference");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(live)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use shelf_core::{Cart, CartId, Customer, Email, Model, NewCustomer, Tag, TagId};

    use super::*;
    use crate::memory::MemoryStore;
    use crate::registry::TargetTable;

    struct BrokenTable;

    #[async_trait]
    impl TargetTable for BrokenTable {
        async fn fetch(&self, _object_id: i32) -> Result<Option<Entity>, RepositoryError> {
            Err(RepositoryError::DataCorruption("bad row".to_owned()))
        }
    }

    async fn customer(store: &MemoryStore) -> Customer {
        let email = Email::parse("ada@example.com").unwrap();
        store
            .insert(NewCustomer::new("Ada", "Lovelace", email, "").build(0.into()))
            .await
    }

    #[tokio::test]
    async fn test_resolve_round_trips_registered_records() {
        let store = MemoryStore::new();
        let resolver = Resolver::new(store.registry());

        let entities = [
            Entity::from(customer(&store).await),
            Entity::from(
                store
                    .insert(Cart {
                        id: CartId::new(0),
                        created_at: Utc::now(),
                    })
                    .await,
            ),
            Entity::from(
                store
                    .insert(Tag {
                        id: TagId::new(0),
                        label: "gift".to_owned(),
                    })
                    .await,
            ),
        ];

        for entity in entities {
            let target = resolver.build_reference(&entity).unwrap();
            assert_eq!(resolver.resolve(&target).await.unwrap(), entity);
        }
    }

    #[tokio::test]
    async fn test_unregistered_type_is_rejected() {
        let store = MemoryStore::new();
        let resolver = Resolver::new(store.registry_for([Customer::CONTENT_TYPE]));

        let cart = Entity::from(
            store
                .insert(Cart {
                    id: CartId::new(0),
                    created_at: Utc::now(),
                })
                .await,
        );

        for _ in 0..2 {
            let err = resolver.build_reference(&cart).unwrap_err();
            assert!(matches!(err, ResolveError::UnregisteredType(ct) if ct == Cart::CONTENT_TYPE));
        }
        assert_eq!(resolver.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_content_type_is_not_found() {
        let resolver = Resolver::new(MemoryStore::new().registry());
        let target: ObjectRef = "warehouse.bin#1".parse().unwrap();

        let err = resolver.resolve(&target).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(missing) if missing == target));
    }

    #[tokio::test]
    async fn test_deleted_target_is_not_found() {
        let store = MemoryStore::new();
        let resolver = Resolver::new(store.registry());

        let target = customer(&store).await.object_ref();
        assert!(store.delete(&target).await);

        let err = resolver.resolve(&target).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let resolver = Resolver::new(
            TypeRegistry::builder()
                .register_model::<Cart>(BrokenTable)
                .build(),
        );
        let target = ObjectRef::new(Cart::CONTENT_TYPE, 1);

        let err = resolver.resolve(&target).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Storage(RepositoryError::DataCorruption(_))
        ));

        let err = resolver.resolve_live([&target]).await.unwrap_err();
        assert!(matches!(err, ResolveError::Storage(_)));
    }

    #[tokio::test]
    async fn test_resolve_live_skips_dangling() {
        let store = MemoryStore::new();
        let resolver = Resolver::new(store.registry());

        let kept = customer(&store).await;
        let missing = ObjectRef::new(Customer::CONTENT_TYPE, 404);
        let unknown: ObjectRef = "legacy.widget#1".parse().unwrap();

        let live = resolver
            .resolve_live([&missing, &kept.object_ref(), &unknown])
            .await
            .unwrap();
        assert_eq!(live, vec![Entity::Customer(kept)]);
    }
}
