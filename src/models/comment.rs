// src/models/comment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Comment row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author's username
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentResponse {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// POST /photos/{id}/comments body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000))]
    pub body: String,
}
