// src/services/comment_service.rs
// DOCUMENTATION: Comment rules
// PURPOSE: Existence and permission checks around CommentRepository

use crate::db::{CommentRepository, PhotoRepository};
use crate::errors::PhotoError;
use crate::models::{CommentResponse, CreateCommentRequest, User};
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct CommentService;

impl CommentService {
    pub async fn add_comment(
        pool: &SqlitePool,
        author: &User,
        photo_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<CommentResponse, PhotoError> {
        let body = req.body.trim();
        if body.is_empty() {
            return Err(PhotoError::ValidationError("comment body is empty".to_string()));
        }

        // 404 rather than a foreign key failure
        PhotoRepository::get_by_id(pool, photo_id).await?;

        let comment = CommentRepository::create_comment(pool, photo_id, author.id, body).await?;
        log::info!("User {} commented on photo {}", author.username, photo_id);

        CommentRepository::get_response(pool, comment.id).await
    }

    pub async fn list_comments(
        pool: &SqlitePool,
        photo_id: Uuid,
    ) -> Result<Vec<CommentResponse>, PhotoError> {
        PhotoRepository::get_by_id(pool, photo_id).await?;
        CommentRepository::list_for_photo(pool, photo_id).await
    }

    /// The comment's author or the photo's owner may delete it
    pub async fn delete_comment(pool: &SqlitePool, user: &User, id: Uuid) -> Result<(), PhotoError> {
        let comment = CommentRepository::get_by_id(pool, id).await?;

        if comment.author_id != user.id {
            let photo = PhotoRepository::get_by_id(pool, comment.photo_id).await?;
            if photo.owner_id != user.id {
                log::warn!("User {} tried to delete comment {}", user.username, id);
                return Err(PhotoError::Forbidden);
            }
        }

        CommentRepository::delete_comment(pool, id).await
    }
}
