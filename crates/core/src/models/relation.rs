//! Tags and likes attached to arbitrary records.
//!
//! [`TaggedItem`] and [`LikedItem`] hold an [`ObjectRef`] to their target
//! rather than a typed foreign key, so any record with a content type can be
//! tagged or liked. The target may disappear after the association is
//! created; resolving such a reference reports it as not found.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{LikedItemId, ObjectRef, TagId, TaggedItemId, UserId};

/// A site user. Owner of likes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Errors that can occur when validating a tag label.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TagLabelError {
    #[error("tag label cannot be empty")]
    Empty,
    #[error("tag label must be at most {max} characters")]
    TooLong { max: usize },
}

/// A label that can be attached to any record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Tag {
    pub id: TagId,
    pub label: String,
}

impl Tag {
    /// Maximum label length in characters.
    pub const MAX_LABEL_LENGTH: usize = 255;

    /// Trim and validate a label.
    ///
    /// # Errors
    ///
    /// Returns [`TagLabelError`] if the trimmed label is empty or longer than
    /// [`Tag::MAX_LABEL_LENGTH`] characters.
    pub fn normalize_label(label: &str) -> Result<String, TagLabelError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(TagLabelError::Empty);
        }
        if label.chars().count() > Self::MAX_LABEL_LENGTH {
            return Err(TagLabelError::TooLong {
                max: Self::MAX_LABEL_LENGTH,
            });
        }
        Ok(label.to_owned())
    }

    /// Path of the tag's detail page.
    #[must_use]
    pub fn absolute_path(&self) -> String {
        format!("/tags/{}", self.id)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// One tag applied to one target record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct TaggedItem {
    pub id: TaggedItemId,
    pub tag_id: TagId,
    #[cfg_attr(feature = "postgres", sqlx(flatten))]
    pub target: ObjectRef,
}

impl TaggedItem {
    /// Path of the tagged item's detail page.
    #[must_use]
    pub fn absolute_path(&self) -> String {
        format!("/tags/items/{}", self.id)
    }
}

/// A user liking a target record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct LikedItem {
    pub id: LikedItemId,
    pub user_id: UserId,
    #[cfg_attr(feature = "postgres", sqlx(flatten))]
    pub target: ObjectRef,
    pub created_at: DateTime<Utc>,
}

impl LikedItem {
    /// Path of the like's detail page.
    #[must_use]
    pub fn absolute_path(&self) -> String {
        format!("/likes/{}", self.id)
    }
}
