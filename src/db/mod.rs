// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod comment_repository;
pub mod photo_repository;
pub mod schema;
pub mod tag_repository;
pub mod user_repository;

pub use comment_repository::*;
pub use photo_repository::*;
pub use schema::init_schema;
pub use tag_repository::*;
pub use user_repository::*;

#[cfg(test)]
pub(crate) mod test_support {
    use super::{init_schema, PhotoRepository, UserRepository};
    use crate::config::init_memory_pool;
    use crate::models::{NewPhotoRecord, Photo, User};
    use sqlx::SqlitePool;
    use uuid::Uuid;

    pub async fn setup_pool() -> SqlitePool {
        let pool = init_memory_pool().await.unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    /// Account with a placeholder hash; bcrypt is not needed for repository tests
    pub async fn insert_user(pool: &SqlitePool, username: &str) -> User {
        UserRepository::create_user(
            pool,
            username,
            &format!("{}@example.com", username),
            "not-a-real-hash",
        )
        .await
        .unwrap()
    }

    pub async fn insert_photo(pool: &SqlitePool, owner_id: Uuid, description: Option<&str>) -> Photo {
        let id = Uuid::new_v4();
        let record = NewPhotoRecord {
            id,
            owner_id,
            file_path: format!("{}.png", id),
            original_filename: Some("test.png".to_string()),
            content_type: "image/png".to_string(),
            file_size: 67,
            description: description.map(str::to_string),
            alt_text: None,
            detected_text: None,
            dominant_colors: Vec::new(),
        };

        let mut conn = pool.acquire().await.unwrap();
        PhotoRepository::create_photo(&mut conn, &record).await.unwrap()
    }
}
