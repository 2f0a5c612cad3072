// src/db/comment_repository.rs
// DOCUMENTATION: Comment database operations
// PURPOSE: Handle CRUD operations for photo comments

use crate::errors::PhotoError;
use crate::models::{Comment, CommentResponse};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct CommentRepository;

impl CommentRepository {
    pub async fn create_comment(
        pool: &SqlitePool,
        photo_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> Result<Comment, PhotoError> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, photo_id, author_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(photo_id)
        .bind(author_id)
        .bind(body)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create comment on photo {}: {}", photo_id, e);
            PhotoError::DatabaseError(format!("Create comment failed: {}", e))
        })
    }

    pub async fn get_by_id(pool: &SqlitePool, id: Uuid) -> Result<Comment, PhotoError> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| PhotoError::DatabaseError(e.to_string()))?
            .ok_or_else(|| PhotoError::NotFound(format!("comment {}", id)))
    }

    /// Comment with its author's username
    pub async fn get_response(pool: &SqlitePool, id: Uuid) -> Result<CommentResponse, PhotoError> {
        sqlx::query_as::<_, CommentResponse>(
            r#"
            SELECT c.id, c.photo_id, c.author_id, u.username AS author_username,
                   c.body, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| PhotoError::DatabaseError(e.to_string()))?
        .ok_or_else(|| PhotoError::NotFound(format!("comment {}", id)))
    }

    /// Comments of a photo, oldest first
    pub async fn list_for_photo(
        pool: &SqlitePool,
        photo_id: Uuid,
    ) -> Result<Vec<CommentResponse>, PhotoError> {
        sqlx::query_as::<_, CommentResponse>(
            r#"
            SELECT c.id, c.photo_id, c.author_id, u.username AS author_username,
                   c.body, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.photo_id = $1
            ORDER BY c.created_at ASC, c.rowid ASC
            "#,
        )
        .bind(photo_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch comments for photo {}: {}", photo_id, e);
            PhotoError::DatabaseError(format!("Fetch comments failed: {}", e))
        })
    }

    pub async fn delete_comment(pool: &SqlitePool, id: Uuid) -> Result<(), PhotoError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to delete comment {}: {}", id, e);
                PhotoError::DatabaseError(format!("Delete comment failed: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(PhotoError::NotFound(format!("comment {}", id)));
        }

        Ok(())
    }
}
