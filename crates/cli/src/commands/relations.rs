//! Tag and like commands.
//!
//! # Usage
//!
//! ```bash
//! shelf-cli tag create sale
//! shelf-cli tag apply sale store.product#7
//! shelf-cli tag list store.product#7
//! shelf-cli like add ada store.product#7
//! ```
//!
//! Targets are not checked when a tag or like is added, but a warning is
//! logged if the target does not currently resolve.

use shelf_core::{ObjectRef, Tag};
use shelf_store::db::{PgRelations, UserRepository, registry};
use shelf_store::{RelationStore, ResolveError, Resolver};
use sqlx::PgPool;

use super::connect;

/// Create a tag.
///
/// # Errors
///
/// Returns an error if the label is invalid or the database fails.
pub async fn create_tag(label: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let tag = PgRelations::new(pool).create_tag(label).await?;
    tracing::info!("Created tag {} ({})", tag.id, tag.label);
    Ok(())
}

/// Apply the tag with `label` to `target`, creating the tag if needed.
///
/// # Errors
///
/// Returns an error if the tag is already applied or the database fails.
pub async fn apply_tag(label: &str, target: &ObjectRef) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    warn_if_dangling(&pool, target).await?;

    let relations = PgRelations::new(pool);
    let tag = find_or_create_tag(&relations, label).await?;
    let item = relations.tag(tag.id, target).await?;

    tracing::info!("Tagged {target} with {} ({})", tag.label, item.absolute_path());
    Ok(())
}

/// Log the tags applied to `target`.
///
/// # Errors
///
/// Returns an error if the database fails.
pub async fn list_tags(target: &ObjectRef) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let tags = PgRelations::new(pool).tags_for(target).await?;

    tracing::info!("{} tag(s) on {target}", tags.len());
    for tag in tags {
        tracing::info!("  {} {}", tag.id, tag.label);
    }
    Ok(())
}

/// Record that the user named `username` likes `target`.
///
/// # Errors
///
/// Returns an error if the user does not exist, already likes the target, or
/// the database fails.
pub async fn add_like(username: &str, target: &ObjectRef) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let user = UserRepository::new(&pool)
        .get_by_username(username)
        .await?
        .ok_or_else(|| format!("No user named {username}"))?;
    warn_if_dangling(&pool, target).await?;

    let relations = PgRelations::new(pool);
    relations.like(user.id, target).await?;
    let count = relations.like_count(target).await?;

    tracing::info!("{} likes {target} ({count} like(s) total)", user.username);
    Ok(())
}

pub(crate) async fn find_or_create_tag<R: RelationStore>(
    relations: &R,
    label: &str,
) -> Result<Tag, shelf_store::RepositoryError> {
    match relations.find_tag(label).await? {
        Some(tag) => Ok(tag),
        None => relations.create_tag(label).await,
    }
}

async fn warn_if_dangling(pool: &PgPool, target: &ObjectRef) -> Result<(), ResolveError> {
    match Resolver::new(registry(pool)).resolve(target).await {
        Ok(_) => Ok(()),
        Err(ResolveError::NotFound(_)) => {
            tracing::warn!(%target, "Target does not exist; the reference will not resolve");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shelf_store::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_find_or_create_tag_reuses_existing() {
        let store = MemoryStore::new();
        let first = find_or_create_tag(&store, "sale").await.unwrap();
        let second = find_or_create_tag(&store, " sale").await.unwrap();
        assert_eq!(first, second);

        let other = find_or_create_tag(&store, "new").await.unwrap();
        assert_ne!(first.id, other.id);
    }
}
