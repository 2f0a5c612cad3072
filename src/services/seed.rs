// src/services/seed.rs
// DOCUMENTATION: Demo data for local development
// PURPOSE: Backing for `photoshare-manage seed-demo`; safe to run repeatedly

use crate::db::{CommentRepository, PhotoRepository, TagRepository, UserRepository};
use crate::errors::PhotoError;
use crate::models::{parse_tag_list, NewPhotoRecord, User};
use crate::services::auth_service::hash_password;
use crate::services::storage::{ImageFormat, UploadStore, PLACEHOLDER_PNG};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Password shared by every demo account
pub const DEMO_PASSWORD: &str = "photoshare-demo";

struct DemoPhoto {
    owner: &'static str,
    description: &'static str,
    tags: &'static str,
    comments: &'static [(&'static str, &'static str)],
}

const DEMO_USERS: &[&str] = &["alice", "bob"];

const DEMO_PHOTOS: &[DemoPhoto] = &[
    DemoPhoto {
        owner: "alice",
        description: "Morning walk in the park",
        tags: "dog, park, morning",
        comments: &[("bob", "Great light!")],
    },
    DemoPhoto {
        owner: "alice",
        description: "Sunset over the harbour",
        tags: "sunset, sea, boats",
        comments: &[("bob", "Where is this?"), ("alice", "Near the old lighthouse")],
    },
    DemoPhoto {
        owner: "bob",
        description: "Homemade pizza",
        tags: "food, pizza",
        comments: &[],
    },
];

/// What a seed run created
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub users_created: usize,
    pub photos_created: usize,
    pub comments_created: usize,
}

pub struct SeedService;

impl SeedService {
    /// Create the demo accounts and, for accounts without photos, their photos
    pub async fn seed_demo(
        pool: &SqlitePool,
        store: &UploadStore,
        bcrypt_cost: u32,
    ) -> Result<SeedSummary, PhotoError> {
        let mut summary = SeedSummary::default();
        // (user, has no photos yet)
        let mut users: Vec<(User, bool)> = Vec::new();

        for username in DEMO_USERS {
            let user = match UserRepository::find_by_username(pool, username).await? {
                Some(user) => user,
                None => {
                    let hash = hash_password(DEMO_PASSWORD.to_string(), bcrypt_cost).await?;
                    let email = format!("{}@photoshare.local", username);
                    summary.users_created += 1;
                    UserRepository::create_user(pool, username, &email, &hash).await?
                }
            };
            let empty = PhotoRepository::file_paths_for_owner(pool, user.id).await?.is_empty();
            users.push((user, empty));
        }

        let lookup = |name: &str| users.iter().find(|(u, _)| u.username == name);

        for demo in DEMO_PHOTOS {
            let owner = match lookup(demo.owner) {
                Some((owner, true)) => owner,
                Some((owner, false)) => {
                    log::debug!("{} already has photos, skipping demo photo", owner.username);
                    continue;
                }
                None => continue,
            };

            let photo_id = Self::insert_demo_photo(pool, store, owner, demo).await?;
            summary.photos_created += 1;

            for &(author, body) in demo.comments {
                if let Some((author, _)) = lookup(author) {
                    CommentRepository::create_comment(pool, photo_id, author.id, body).await?;
                    summary.comments_created += 1;
                }
            }
        }

        log::info!(
            "Seeded {} users, {} photos, {} comments",
            summary.users_created,
            summary.photos_created,
            summary.comments_created
        );
        Ok(summary)
    }

    async fn insert_demo_photo(
        pool: &SqlitePool,
        store: &UploadStore,
        owner: &User,
        demo: &DemoPhoto,
    ) -> Result<Uuid, PhotoError> {
        let id = Uuid::new_v4();
        let file_path = store.save(id, ImageFormat::Png, PLACEHOLDER_PNG).await?;

        let record = NewPhotoRecord {
            id,
            owner_id: owner.id,
            file_path,
            original_filename: Some("demo.png".to_string()),
            content_type: ImageFormat::Png.content_type().to_string(),
            file_size: PLACEHOLDER_PNG.len() as i64,
            description: Some(demo.description.to_string()),
            alt_text: Some(demo.description.to_string()),
            detected_text: None,
            dominant_colors: Vec::new(),
        };

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;
        PhotoRepository::create_photo(&mut tx, &record).await?;
        TagRepository::attach_tags(&mut tx, id, &parse_tag_list(demo.tags)).await?;
        tx.commit()
            .await
            .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_pool;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = setup_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), 1024);

        let first = SeedService::seed_demo(&pool, &store, 4).await.unwrap();
        assert_eq!(
            first,
            SeedSummary {
                users_created: 2,
                photos_created: 3,
                comments_created: 3
            }
        );

        let second = SeedService::seed_demo(&pool, &store, 4).await.unwrap();
        assert_eq!(second, SeedSummary::default());

        let tags = TagRepository::list_with_counts(&pool).await.unwrap();
        assert_eq!(tags.len(), 8);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }
}
