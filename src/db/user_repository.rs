// src/db/user_repository.rs
// DOCUMENTATION: User database operations
// PURPOSE: Handle account rows and bearer token lookups

use crate::errors::PhotoError;
use crate::models::User;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct UserRepository;

impl UserRepository {
    /// Insert a new account with an already hashed password
    pub async fn create_user(
        pool: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, PhotoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, api_token, created_at)
            VALUES ($1, $2, $3, $4, NULL, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create user {}: {}", username, e);
            PhotoError::DatabaseError(format!("Create user failed: {}", e))
        })?;

        log::info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn get_by_id(pool: &SqlitePool, id: Uuid) -> Result<User, PhotoError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch user {}: {}", id, e);
                PhotoError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| PhotoError::NotFound(format!("user {}", id)))
    }

    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, PhotoError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch user by name: {}", e);
                PhotoError::DatabaseError(e.to_string())
            })
    }

    /// True when either the username or the email is taken
    pub async fn exists(pool: &SqlitePool, username: &str, email: &str) -> Result<bool, PhotoError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1 OR email = $2")
                .bind(username)
                .bind(email)
                .fetch_one(pool)
                .await
                .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;

        Ok(count > 0)
    }

    /// Look up the account owning a token hash
    pub async fn find_by_token_hash(
        pool: &SqlitePool,
        token_hash: &str,
    ) -> Result<Option<User>, PhotoError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE api_token = $1")
            .bind(token_hash)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch user by token: {}", e);
                PhotoError::DatabaseError(e.to_string())
            })
    }

    /// Replace (or clear) the stored token hash
    pub async fn set_token_hash(
        pool: &SqlitePool,
        id: Uuid,
        token_hash: Option<&str>,
    ) -> Result<(), PhotoError> {
        sqlx::query("UPDATE users SET api_token = $1 WHERE id = $2")
            .bind(token_hash)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to update token for user {}: {}", id, e);
                PhotoError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }

    /// Photo and comment counts for a profile page
    pub async fn activity_counts(pool: &SqlitePool, id: Uuid) -> Result<(i64, i64), PhotoError> {
        sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM photos WHERE owner_id = $1),
                (SELECT COUNT(*) FROM comments WHERE author_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(|e| PhotoError::DatabaseError(e.to_string()))
    }

    /// Delete an account
    /// Photos, their comments and tag links and the user's own comments go with it
    pub async fn delete_user(pool: &SqlitePool, id: Uuid) -> Result<(), PhotoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to delete user {}: {}", id, e);
                PhotoError::DatabaseError(format!("Delete user failed: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(PhotoError::NotFound(format!("user {}", id)));
        }

        log::info!("Deleted user {}", id);
        Ok(())
    }
}
