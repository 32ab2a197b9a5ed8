//! Generic access to any table holding a [`Model`].
//!
//! [`PgRecord`] ties a model to its table. That is enough to fetch a row by
//! id, delete it together with the generic references pointing at it, and
//! expose the table to the type registry through [`PgTable`].

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, PgPool};

use shelf_core::{
    Address, Cart, CartItem, Collection, ContentType, Customer, Entity, Model, ObjectRef, Order,
    OrderItem, Product, Promotion, Tag, User,
};

use super::RepositoryError;
use crate::registry::{TargetTable, TypeRegistry};

/// A child table whose rows are removed when the parent row is deleted.
///
/// Their own tags and likes are pruned along with the parent's.
#[derive(Debug, Clone)]
pub struct ChildTable {
    pub content_type: ContentType,
    pub table: &'static str,
    pub parent_column: &'static str,
}

/// A model stored in a `PostgreSQL` table with an `id` primary key.
pub trait PgRecord: Model + for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Schema qualified table name.
    const TABLE: &'static str;

    /// Tables cascading from this one.
    const CHILDREN: &'static [ChildTable] = &[];
}

impl PgRecord for Product {
    const TABLE: &'static str = "store.product";
    const CHILDREN: &'static [ChildTable] = &[ChildTable {
        content_type: CartItem::CONTENT_TYPE,
        table: "store.cart_item",
        parent_column: "product_id",
    }];
}

impl PgRecord for Collection {
    const TABLE: &'static str = "store.collection";
}

impl PgRecord for Promotion {
    const TABLE: &'static str = "store.promotion";
}

impl PgRecord for Customer {
    const TABLE: &'static str = "store.customer";
    const CHILDREN: &'static [ChildTable] = &[ChildTable {
        content_type: Address::CONTENT_TYPE,
        table: "store.address",
        parent_column: "customer_id",
    }];
}

impl PgRecord for Address {
    const TABLE: &'static str = "store.address";
}

impl PgRecord for Order {
    const TABLE: &'static str = r#"store."order""#;
    const CHILDREN: &'static [ChildTable] = &[ChildTable {
        content_type: OrderItem::CONTENT_TYPE,
        table: "store.order_item",
        parent_column: "order_id",
    }];
}

impl PgRecord for OrderItem {
    const TABLE: &'static str = "store.order_item";
}

impl PgRecord for Cart {
    const TABLE: &'static str = "store.cart";
    const CHILDREN: &'static [ChildTable] = &[ChildTable {
        content_type: CartItem::CONTENT_TYPE,
        table: "store.cart_item",
        parent_column: "cart_id",
    }];
}

impl PgRecord for CartItem {
    const TABLE: &'static str = "store.cart_item";
}

impl PgRecord for User {
    const TABLE: &'static str = r#"auth."user""#;
}

impl PgRecord for Tag {
    const TABLE: &'static str = "tags.tag";
}

/// Fetch one record by primary key.
pub(crate) async fn fetch_by_id<M: PgRecord>(
    pool: &PgPool,
    id: i32,
) -> Result<Option<M>, RepositoryError> {
    let sql = format!("SELECT * FROM {} WHERE id = $1", M::TABLE);
    let record = sqlx::query_as::<_, M>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

/// Delete a record and every tag or like pointing at it or at its children.
///
/// Returns `false` if the record did not exist. A foreign key that still
/// protects the row is reported as [`RepositoryError::Conflict`].
pub(crate) async fn delete_by_id<M: PgRecord>(
    pool: &PgPool,
    id: i32,
) -> Result<bool, RepositoryError> {
    let mut tx = pool.begin().await?;
    let target = ObjectRef::new(M::CONTENT_TYPE, id);

    let mut pruned = prune_references(&mut tx, &target).await?;
    for child in M::CHILDREN {
        pruned += prune_child_references(&mut tx, child, id).await?;
    }

    let sql = format!("DELETE FROM {} WHERE id = $1", M::TABLE);
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            RepositoryError::on_conflict(e, &format!("{target} is still referenced"))
        })?;

    if result.rows_affected() == 0 {
        // Nothing to delete; keep whatever relations point at the id.
        tx.rollback().await?;
        return Ok(false);
    }

    tx.commit().await?;
    tracing::info!(%target, pruned, "Deleted record");
    Ok(true)
}

/// Remove all tags and likes pointing at `target`.
pub(crate) async fn prune_references(
    conn: &mut PgConnection,
    target: &ObjectRef,
) -> Result<u64, sqlx::Error> {
    let tagged = sqlx::query(
        r"
        DELETE FROM tags.tagged_item
        WHERE content_type = $1 AND object_id = $2
        ",
    )
    .bind(&target.content_type)
    .bind(target.object_id)
    .execute(&mut *conn)
    .await?;

    let liked = sqlx::query(
        r"
        DELETE FROM likes.liked_item
        WHERE content_type = $1 AND object_id = $2
        ",
    )
    .bind(&target.content_type)
    .bind(target.object_id)
    .execute(&mut *conn)
    .await?;

    Ok(tagged.rows_affected() + liked.rows_affected())
}

async fn prune_child_references(
    conn: &mut PgConnection,
    child: &ChildTable,
    parent_id: i32,
) -> Result<u64, sqlx::Error> {
    let mut pruned = 0;
    for relation in ["tags.tagged_item", "likes.liked_item"] {
        let sql = format!(
            "DELETE FROM {relation} WHERE content_type = $1 AND object_id IN \
             (SELECT id FROM {} WHERE {} = $2)",
            child.table, child.parent_column
        );
        pruned += sqlx::query(&sql)
            .bind(&child.content_type)
            .bind(parent_id)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }
    Ok(pruned)
}

/// Type registry handle for one `PostgreSQL` table.
pub struct PgTable<M> {
    pool: PgPool,
    _record: PhantomData<fn() -> M>,
}

impl<M: PgRecord> PgTable<M> {
    /// Create a handle backed by `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<M: PgRecord> TargetTable for PgTable<M> {
    async fn fetch(&self, object_id: i32) -> Result<Option<Entity>, RepositoryError> {
        Ok(fetch_by_id::<M>(&self.pool, object_id).await?.map(Into::into))
    }
}

macro_rules! pg_registry {
    ($pool:expr; $($model:ty),+ $(,)?) => {
        TypeRegistry::builder()
            $(.register(<$model as Model>::CONTENT_TYPE, PgTable::<$model>::new($pool.clone())))+
            .build()
    };
}

/// Build a type registry covering every table in the database.
#[must_use]
pub fn registry(pool: &PgPool) -> TypeRegistry {
    pg_registry!(pool; Product, Collection, Promotion, Customer, Address, Order, OrderItem, Cart, CartItem, User, Tag)
}
