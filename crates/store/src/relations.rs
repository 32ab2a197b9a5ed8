//! Tags and likes on arbitrary records.
//!
//! Both relations follow the same rules:
//!
//! - the target is not checked when a tag or like is added
//! - a given tag is applied to a given target at most once, and a user likes
//!   a given target at most once; repeats fail with
//!   [`RepositoryError::Conflict`]
//! - the owner (tag or user) must exist, otherwise
//!   [`RepositoryError::NotFound`]

use async_trait::async_trait;

use shelf_core::{LikedItem, ObjectRef, Tag, TagId, TaggedItem, UserId};

use crate::db::RepositoryError;

/// Storage for tags, tagged items and liked items.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Create a tag after trimming and validating its label.
    async fn create_tag(&self, label: &str) -> Result<Tag, RepositoryError>;

    async fn get_tag(&self, id: TagId) -> Result<Option<Tag>, RepositoryError>;

    /// Oldest tag with exactly this (trimmed) label.
    async fn find_tag(&self, label: &str) -> Result<Option<Tag>, RepositoryError>;

    /// Delete a tag and every application of it.
    async fn delete_tag(&self, id: TagId) -> Result<bool, RepositoryError>;

    /// Apply a tag to a target.
    async fn tag(&self, tag_id: TagId, target: &ObjectRef) -> Result<TaggedItem, RepositoryError>;

    async fn untag(&self, tag_id: TagId, target: &ObjectRef) -> Result<bool, RepositoryError>;

    /// Tags applied to a target, ordered by label.
    async fn tags_for(&self, target: &ObjectRef) -> Result<Vec<Tag>, RepositoryError>;

    /// Every application of a tag, oldest first.
    async fn tagged_with(&self, tag_id: TagId) -> Result<Vec<TaggedItem>, RepositoryError>;

    /// Record that a user likes a target.
    async fn like(&self, user_id: UserId, target: &ObjectRef)
    -> Result<LikedItem, RepositoryError>;

    async fn unlike(&self, user_id: UserId, target: &ObjectRef) -> Result<bool, RepositoryError>;

    /// Everything a user likes, oldest first.
    async fn likes_by(&self, user_id: UserId) -> Result<Vec<LikedItem>, RepositoryError>;

    async fn like_count(&self, target: &ObjectRef) -> Result<i64, RepositoryError>;

    /// Remove every tag application and like pointing at `target`.
    async fn prune(&self, target: &ObjectRef) -> Result<u64, RepositoryError>;
}

pub(crate) fn normalize_label(label: &str) -> Result<String, RepositoryError> {
    Tag::normalize_label(label).map_err(|e| RepositoryError::InvalidInput(e.to_string()))
}
