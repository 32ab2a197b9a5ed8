//! User repository for database operations.

use sqlx::PgPool;

use shelf_core::{User, UserId};

use super::RepositoryError;
use super::table::{delete_by_id, fetch_by_id};

/// Repository for site users.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidInput` if the username is blank.
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, username: &str) -> Result<User, RepositoryError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(RepositoryError::InvalidInput(
                "username cannot be empty".to_owned(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO auth."user" (username)
            VALUES ($1)
            RETURNING id, username, created_at
            "#,
        )
        .bind(username)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_conflict(e, "username already exists"))?;

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        fetch_by_id::<User>(self.pool, id.as_i32()).await
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, created_at
            FROM auth."user"
            WHERE username = $1
            "#,
        )
        .bind(username.trim())
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Delete a user. Their likes go with them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        delete_by_id::<User>(self.pool, id.as_i32()).await
    }
}
