//! In-process store for tests and demos.
//!
//! [`MemoryStore`] keeps every record as an [`Entity`] keyed by content type
//! and id, and implements the same seams as the `PostgreSQL` backend:
//! [`TargetTable`] handles for a [`TypeRegistry`] and [`RelationStore`].
//!
//! Ids are assigned per content type starting at 1. Foreign keys between flat
//! records are not enforced; deleting a record prunes the tags and likes
//! pointing at it, the same as the repositories do.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use shelf_core::{
    ContentType, Entity, LikedItem, LikedItemId, Model, ObjectRef, Tag, TagId, TaggedItem,
    TaggedItemId, User, UserId,
};

use crate::db::RepositoryError;
use crate::registry::{TargetTable, TypeRegistry};
use crate::relations::{RelationStore, normalize_label};

#[derive(Default)]
struct Inner {
    rows: HashMap<ContentType, BTreeMap<i32, Entity>>,
    sequences: HashMap<ContentType, i32>,
    tagged: BTreeMap<i32, TaggedItem>,
    liked: BTreeMap<i32, LikedItem>,
    next_tagged: i32,
    next_liked: i32,
}

impl Inner {
    fn next_id(&mut self, content_type: &ContentType) -> i32 {
        let sequence = self.sequences.entry(content_type.clone()).or_insert(0);
        *sequence += 1;
        *sequence
    }

    fn get(&self, target: &ObjectRef) -> Option<&Entity> {
        self.rows
            .get(&target.content_type)
            .and_then(|rows| rows.get(&target.object_id))
    }

    fn relation_count(&self) -> usize {
        self.tagged.len() + self.liked.len()
    }

    fn prune(&mut self, target: &ObjectRef) -> u64 {
        let before = self.relation_count();
        self.tagged.retain(|_, item| &item.target != target);
        self.liked.retain(|_, item| &item.target != target);
        (before - self.relation_count()) as u64
    }

    /// Drop the relations owned by a deleted user or tag.
    fn cascade(&mut self, owner: &ObjectRef) -> u64 {
        let before = self.relation_count();
        if owner.content_type == User::CONTENT_TYPE {
            let user_id = UserId::new(owner.object_id);
            self.liked.retain(|_, item| item.user_id != user_id);
        } else if owner.content_type == Tag::CONTENT_TYPE {
            let tag_id = TagId::new(owner.object_id);
            self.tagged.retain(|_, item| item.tag_id != tag_id);
        }
        (before - self.relation_count()) as u64
    }
}

/// Shared in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record under a fresh id, ignoring the id it carries.
    pub async fn insert<M: Model>(&self, record: M) -> M {
        let mut inner = self.inner.write().await;
        let id = inner.next_id(&M::CONTENT_TYPE);
        let record = record.with_pk(id);
        inner
            .rows
            .entry(M::CONTENT_TYPE)
            .or_default()
            .insert(id, record.clone().into());
        record
    }

    /// Fetch a record by id.
    pub async fn get<M: Model>(&self, id: i32) -> Option<M> {
        let inner = self.inner.read().await;
        inner
            .get(&ObjectRef::new(M::CONTENT_TYPE, id))
            .cloned()
            .and_then(M::from_entity)
    }

    /// Replace a stored record.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no record has the same id.
    pub async fn update<M: Model>(&self, record: M) -> Result<M, RepositoryError> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .rows
            .get_mut(&M::CONTENT_TYPE)
            .and_then(|rows| rows.get_mut(&record.pk()))
            .ok_or(RepositoryError::NotFound)?;
        *slot = record.clone().into();
        Ok(record)
    }

    /// Delete the record `target` points at and prune references to it.
    ///
    /// Deleting a user also drops the likes they own, and deleting a tag
    /// drops its applications. Returns `false` if there was no such record.
    pub async fn delete(&self, target: &ObjectRef) -> bool {
        let mut inner = self.inner.write().await;
        let removed = inner
            .rows
            .get_mut(&target.content_type)
            .and_then(|rows| rows.remove(&target.object_id))
            .is_some();

        if removed {
            let pruned = inner.prune(target) + inner.cascade(target);
            tracing::debug!(%target, pruned, "Deleted in-memory record");
        }
        removed
    }

    /// A registry handle for `content_type`.
    #[must_use]
    pub fn table(&self, content_type: ContentType) -> MemoryTable {
        MemoryTable {
            store: self.clone(),
            content_type,
        }
    }

    /// Registry covering every record type.
    #[must_use]
    pub fn registry(&self) -> TypeRegistry {
        self.registry_for(Entity::CONTENT_TYPES.iter().cloned())
    }

    /// Registry covering only `content_types`.
    #[must_use]
    pub fn registry_for<I>(&self, content_types: I) -> TypeRegistry
    where
        I: IntoIterator<Item = ContentType>,
    {
        content_types
            .into_iter()
            .fold(TypeRegistry::builder(), |builder, content_type| {
                let table = self.table(content_type.clone());
                builder.register(content_type, table)
            })
            .build()
    }
}

/// [`TargetTable`] over one content type of a [`MemoryStore`].
pub struct MemoryTable {
    store: MemoryStore,
    content_type: ContentType,
}

#[async_trait]
impl TargetTable for MemoryTable {
    async fn fetch(&self, object_id: i32) -> Result<Option<Entity>, RepositoryError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .get(&ObjectRef::new(self.content_type.clone(), object_id))
            .cloned())
    }
}

#[async_trait]
impl RelationStore for MemoryStore {
    async fn create_tag(&self, label: &str) -> Result<Tag, RepositoryError> {
        let label = normalize_label(label)?;
        Ok(self
            .insert(Tag {
                id: TagId::new(0),
                label,
            })
            .await)
    }

    async fn get_tag(&self, id: TagId) -> Result<Option<Tag>, RepositoryError> {
        Ok(self.get::<Tag>(id.as_i32()).await)
    }

    async fn find_tag(&self, label: &str) -> Result<Option<Tag>, RepositoryError> {
        let label = label.trim();
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .get(&Tag::CONTENT_TYPE)
            .into_iter()
            .flat_map(BTreeMap::values)
            .filter_map(|entity| Tag::from_entity(entity.clone()))
            .find(|tag| tag.label == label))
    }

    async fn delete_tag(&self, id: TagId) -> Result<bool, RepositoryError> {
        Ok(self.delete(&ObjectRef::new(Tag::CONTENT_TYPE, id.as_i32())).await)
    }

    async fn tag(&self, tag_id: TagId, target: &ObjectRef) -> Result<TaggedItem, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner
            .get(&ObjectRef::new(Tag::CONTENT_TYPE, tag_id.as_i32()))
            .is_none()
        {
            return Err(RepositoryError::NotFound);
        }
        if inner
            .tagged
            .values()
            .any(|item| item.tag_id == tag_id && &item.target == target)
        {
            return Err(RepositoryError::Conflict(format!(
                "tag {tag_id} already applied to {target}"
            )));
        }

        inner.next_tagged += 1;
        let item = TaggedItem {
            id: TaggedItemId::new(inner.next_tagged),
            tag_id,
            target: target.clone(),
        };
        inner.tagged.insert(item.id.as_i32(), item.clone());
        Ok(item)
    }

    async fn untag(&self, tag_id: TagId, target: &ObjectRef) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let before = inner.tagged.len();
        inner
            .tagged
            .retain(|_, item| !(item.tag_id == tag_id && &item.target == target));
        Ok(inner.tagged.len() < before)
    }

    async fn tags_for(&self, target: &ObjectRef) -> Result<Vec<Tag>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut tags: Vec<Tag> = inner
            .tagged
            .values()
            .filter(|item| &item.target == target)
            .filter_map(|item| {
                inner
                    .get(&ObjectRef::new(Tag::CONTENT_TYPE, item.tag_id.as_i32()))
                    .cloned()
                    .and_then(Tag::from_entity)
            })
            .collect();
        tags.sort_by(|a, b| a.label.cmp(&b.label).then(a.id.cmp(&b.id)));
        Ok(tags)
    }

    async fn tagged_with(&self, tag_id: TagId) -> Result<Vec<TaggedItem>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tagged
            .values()
            .filter(|item| item.tag_id == tag_id)
            .cloned()
            .collect())
    }

    async fn like(
        &self,
        user_id: UserId,
        target: &ObjectRef,
    ) -> Result<LikedItem, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner
            .get(&ObjectRef::new(User::CONTENT_TYPE, user_id.as_i32()))
            .is_none()
        {
            return Err(RepositoryError::NotFound);
        }
        if inner
            .liked
            .values()
            .any(|item| item.user_id == user_id && &item.target == target)
        {
            return Err(RepositoryError::Conflict(format!(
                "user {user_id} already likes {target}"
            )));
        }

        inner.next_liked += 1;
        let item = LikedItem {
            id: LikedItemId::new(inner.next_liked),
            user_id,
            target: target.clone(),
            created_at: Utc::now(),
        };
        inner.liked.insert(item.id.as_i32(), item.clone());
        Ok(item)
    }

    async fn unlike(&self, user_id: UserId, target: &ObjectRef) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let before = inner.liked.len();
        inner
            .liked
            .retain(|_, item| !(item.user_id == user_id && &item.target == target));
        Ok(inner.liked.len() < before)
    }

    async fn likes_by(&self, user_id: UserId) -> Result<Vec<LikedItem>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .liked
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn like_count(&self, target: &ObjectRef) -> Result<i64, RepositoryError> {
        let inner = self.inner.read().await;
        let count = inner
            .liked
            .values()
            .filter(|item| &item.target == target)
            .count();
        i64::try_from(count).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
    }

    async fn prune(&self, target: &ObjectRef) -> Result<u64, RepositoryError> {
        Ok(self.inner.write().await.prune(target))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shelf_core::{NewProduct, Price, Product, ProductId};

    use super::*;
    use crate::resolver::{ResolveError, Resolver};

    fn product(title: &str) -> Product {
        NewProduct {
            title: title.to_owned(),
            description: String::new(),
            price: Price::new(Decimal::new(1250, 2)).unwrap(),
            inventory: 3,
            collection_id: None,
        }
        .build(ProductId::new(0), Utc::now())
    }

    async fn user(store: &MemoryStore, username: &str) -> User {
        store
            .insert(User {
                id: UserId::new(0),
                username: username.to_owned(),
                created_at: Utc::now(),
            })
            .await
    }

    #[tokio::test]
    async fn test_ids_are_assigned_per_content_type() {
        let store = MemoryStore::new();
        let first = store.insert(product("Mug")).await;
        let second = store.insert(product("Cup")).await;
        let tag = store.create_tag("kitchen").await.unwrap();

        assert_eq!(first.id, ProductId::new(1));
        assert_eq!(second.id, ProductId::new(2));
        assert_eq!(tag.id, TagId::new(1));
        assert_eq!(store.get::<Product>(2).await.unwrap().title, "Cup");
        assert!(store.get::<Tag>(2).await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_likes_are_rejected() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada").await;
        let bob = user(&store, "bob").await;
        let target = store.insert(product("Mug")).await.object_ref();

        store.like(ada.id, &target).await.unwrap();
        let err = store.like(ada.id, &target).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        store.like(bob.id, &target).await.unwrap();
        assert_eq!(store.like_count(&target).await.unwrap(), 2);
        assert_eq!(store.likes_by(ada.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_like_requires_existing_user() {
        let store = MemoryStore::new();
        let target = ObjectRef::new(Product::CONTENT_TYPE, 1);
        let err = store.like(UserId::new(9), &target).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_unlike() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada").await;
        let target = store.insert(product("Mug")).await.object_ref();

        store.like(ada.id, &target).await.unwrap();
        assert!(store.unlike(ada.id, &target).await.unwrap());
        assert!(!store.unlike(ada.id, &target).await.unwrap());
        assert_eq!(store.like_count(&target).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_tags_for_target() {
        let store = MemoryStore::new();
        let sale = store.create_tag(" sale ").await.unwrap();
        let new = store.create_tag("new").await.unwrap();
        let mug = store.insert(product("Mug")).await.object_ref();

        store.tag(sale.id, &mug).await.unwrap();
        store.tag(new.id, &mug).await.unwrap();
        let err = store.tag(sale.id, &mug).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let labels: Vec<_> = store
            .tags_for(&mug)
            .await
            .unwrap()
            .into_iter()
            .map(|tag| tag.label)
            .collect();
        assert_eq!(labels, ["new", "sale"]);

        assert_eq!(store.find_tag("sale").await.unwrap(), Some(sale.clone()));
        assert!(store.untag(sale.id, &mug).await.unwrap());
        assert_eq!(store.tags_for(&mug).await.unwrap(), vec![new]);
    }

    #[tokio::test]
    async fn test_invalid_label() {
        let store = MemoryStore::new();
        let err = store.create_tag("   ").await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_delete_tag_removes_applications() {
        let store = MemoryStore::new();
        let sale = store.create_tag("sale").await.unwrap();
        let mug = store.insert(product("Mug")).await.object_ref();
        store.tag(sale.id, &mug).await.unwrap();

        assert!(store.delete_tag(sale.id).await.unwrap());
        assert!(store.tagged_with(sale.id).await.unwrap().is_empty());
        assert!(store.get_tag(sale.id).await.unwrap().is_none());
        assert!(!store.delete_tag(sale.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_deleting_user_drops_their_likes() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada").await;
        let bob = user(&store, "bob").await;
        let mug = store.insert(product("Mug")).await.object_ref();
        store.like(ada.id, &mug).await.unwrap();
        store.like(bob.id, &mug).await.unwrap();

        assert!(store.delete(&ada.object_ref()).await);
        assert!(store.likes_by(ada.id).await.unwrap().is_empty());
        assert_eq!(store.like_count(&mug).await.unwrap(), 1);
        assert_eq!(store.likes_by(bob.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_tag_record_drops_applications() {
        let store = MemoryStore::new();
        let sale = store.create_tag("sale").await.unwrap();
        let new = store.create_tag("new").await.unwrap();
        let mug = store.insert(product("Mug")).await.object_ref();
        store.tag(sale.id, &mug).await.unwrap();
        store.tag(new.id, &mug).await.unwrap();

        assert!(store.delete(&sale.object_ref()).await);
        assert!(store.tagged_with(sale.id).await.unwrap().is_empty());
        assert_eq!(store.tags_for(&mug).await.unwrap(), vec![new]);
    }

    #[tokio::test]
    async fn test_tagged_product_scenario() {
        let store = MemoryStore::new();
        let resolver = Resolver::new(store.registry());

        for title in ["One", "Two", "Three", "Four", "Five", "Six"] {
            store.insert(product(title)).await;
        }
        let seventh = store.insert(product("Seven")).await;
        assert_eq!(seventh.id, ProductId::new(7));

        let sale = store.create_tag("sale").await.unwrap();
        let item = store.tag(sale.id, &seventh.object_ref()).await.unwrap();

        let updated = store
            .update(Product {
                inventory: 0,
                ..seventh.clone()
            })
            .await
            .unwrap();
        let resolved = resolver.resolve(&item.target).await.unwrap();
        assert_eq!(resolved, Entity::Product(updated));

        assert!(store.delete(&seventh.object_ref()).await);
        let err = resolver.resolve(&item.target).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(target) if target == item.target));
        assert!(store.tagged_with(sale.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_references_to_missing_rows_are_allowed() {
        let store = MemoryStore::new();
        let resolver = Resolver::new(store.registry());
        let sale = store.create_tag("sale").await.unwrap();
        let ghost = ObjectRef::new(Product::CONTENT_TYPE, 99);

        let item = store.tag(sale.id, &ghost).await.unwrap();
        assert!(matches!(
            resolver.resolve(&item.target).await,
            Err(ResolveError::NotFound(_))
        ));
        assert_eq!(store.prune(&ghost).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = MemoryStore::new();
        let err = store.update(product("Mug").with_pk(5)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
