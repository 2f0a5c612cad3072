// src/services/user_service.rs
// DOCUMENTATION: Profiles and account removal

use crate::db::{PhotoRepository, UserRepository};
use crate::errors::PhotoError;
use crate::models::{User, UserProfileResponse};
use crate::services::storage::UploadStore;
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct UserService;

impl UserService {
    pub async fn get_profile(pool: &SqlitePool, id: Uuid) -> Result<UserProfileResponse, PhotoError> {
        let user = UserRepository::get_by_id(pool, id).await?;
        let (photo_count, comment_count) = UserRepository::activity_counts(pool, id).await?;

        Ok(UserProfileResponse {
            user: user.to_response(),
            photo_count,
            comment_count,
        })
    }

    /// Delete the account and everything it owns, then the stored files
    pub async fn delete_account(
        pool: &SqlitePool,
        store: &UploadStore,
        user: &User,
    ) -> Result<(), PhotoError> {
        let files = PhotoRepository::file_paths_for_owner(pool, user.id).await?;
        UserRepository::delete_user(pool, user.id).await?;

        for file in &files {
            store.remove(file).await;
        }

        log::info!("Account {} removed with {} photos", user.username, files.len());
        Ok(())
    }
}
