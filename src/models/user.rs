// src/models/user.rs
// DOCUMENTATION: Account records and auth DTOs
// PURPOSE: Map the users table and the register/login payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Account row
/// Never serialized directly: it carries the password and token hashes
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// SHA-256 of the current bearer token, if logged in
    pub api_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// POST /auth/register body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// POST /auth/login body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Public user DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Returned by a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// GET /users/{id} response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub photo_count: i64,
    pub comment_count: i64,
}

impl User {
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username.clone(),
            created_at: self.created_at,
        }
    }
}
