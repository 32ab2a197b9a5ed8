//! `PostgreSQL` tags and likes.

use async_trait::async_trait;
use sqlx::PgPool;

use shelf_core::{LikedItem, ObjectRef, Tag, TagId, TaggedItem, UserId};

use super::RepositoryError;
use super::table::{delete_by_id, fetch_by_id, prune_references};
use crate::relations::{RelationStore, normalize_label};

/// [`RelationStore`] backed by the `tags` and `likes` schemas.
#[derive(Debug, Clone)]
pub struct PgRelations {
    pool: PgPool,
}

impl PgRelations {
    /// Create a relation store backed by `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationStore for PgRelations {
    async fn create_tag(&self, label: &str) -> Result<Tag, RepositoryError> {
        let label = normalize_label(label)?;
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags.tag (label) VALUES ($1) RETURNING id, label",
        )
        .bind(&label)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(tag_id = %tag.id, label = %tag.label, "Created tag");
        Ok(tag)
    }

    async fn get_tag(&self, id: TagId) -> Result<Option<Tag>, RepositoryError> {
        fetch_by_id::<Tag>(&self.pool, id.as_i32()).await
    }

    async fn find_tag(&self, label: &str) -> Result<Option<Tag>, RepositoryError> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT id, label FROM tags.tag WHERE label = $1 ORDER BY id LIMIT 1",
        )
        .bind(label.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(tag)
    }

    async fn delete_tag(&self, id: TagId) -> Result<bool, RepositoryError> {
        // tagged_item rows go with the tag through ON DELETE CASCADE
        delete_by_id::<Tag>(&self.pool, id.as_i32()).await
    }

    async fn tag(&self, tag_id: TagId, target: &ObjectRef) -> Result<TaggedItem, RepositoryError> {
        let item = sqlx::query_as::<_, TaggedItem>(
            r"
            INSERT INTO tags.tagged_item (tag_id, content_type, object_id)
            VALUES ($1, $2, $3)
            RETURNING id, tag_id, content_type, object_id
            ",
        )
        .bind(tag_id)
        .bind(&target.content_type)
        .bind(target.object_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            RepositoryError::on_insert(e, &format!("tag {tag_id} already applied to {target}"))
        })?;

        tracing::debug!(%tag_id, %target, "Applied tag");
        Ok(item)
    }

    async fn untag(&self, tag_id: TagId, target: &ObjectRef) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM tags.tagged_item
            WHERE tag_id = $1 AND content_type = $2 AND object_id = $3
            ",
        )
        .bind(tag_id)
        .bind(&target.content_type)
        .bind(target.object_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn tags_for(&self, target: &ObjectRef) -> Result<Vec<Tag>, RepositoryError> {
        let tags = sqlx::query_as::<_, Tag>(
            r"
            SELECT t.id, t.label
            FROM tags.tag t
            JOIN tags.tagged_item ti ON ti.tag_id = t.id
            WHERE ti.content_type = $1 AND ti.object_id = $2
            ORDER BY t.label, t.id
            ",
        )
        .bind(&target.content_type)
        .bind(target.object_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn tagged_with(&self, tag_id: TagId) -> Result<Vec<TaggedItem>, RepositoryError> {
        let items = sqlx::query_as::<_, TaggedItem>(
            r"
            SELECT id, tag_id, content_type, object_id
            FROM tags.tagged_item
            WHERE tag_id = $1
            ORDER BY id
            ",
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn like(
        &self,
        user_id: UserId,
        target: &ObjectRef,
    ) -> Result<LikedItem, RepositoryError> {
        let item = sqlx::query_as::<_, LikedItem>(
            r"
            INSERT INTO likes.liked_item (user_id, content_type, object_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, content_type, object_id, created_at
            ",
        )
        .bind(user_id)
        .bind(&target.content_type)
        .bind(target.object_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            RepositoryError::on_insert(e, &format!("user {user_id} already likes {target}"))
        })?;

        tracing::debug!(%user_id, %target, "Recorded like");
        Ok(item)
    }

    async fn unlike(&self, user_id: UserId, target: &ObjectRef) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM likes.liked_item
            WHERE user_id = $1 AND content_type = $2 AND object_id = $3
            ",
        )
        .bind(user_id)
        .bind(&target.content_type)
        .bind(target.object_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn likes_by(&self, user_id: UserId) -> Result<Vec<LikedItem>, RepositoryError> {
        let items = sqlx::query_as::<_, LikedItem>(
            r"
            SELECT id, user_id, content_type, object_id, created_at
            FROM likes.liked_item
            WHERE user_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn like_count(&self, target: &ObjectRef) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM likes.liked_item
            WHERE content_type = $1 AND object_id = $2
            ",
        )
        .bind(&target.content_type)
        .bind(target.object_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn prune(&self, target: &ObjectRef) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let pruned = prune_references(&mut *conn, target).await?;
        tracing::debug!(%target, pruned, "Pruned references");
        Ok(pruned)
    }
}
