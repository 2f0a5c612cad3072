// src/db/tag_repository.rs
// DOCUMENTATION: Tag database operations
// PURPOSE: Deduplicated tag rows and the photo <-> tag link table

use crate::errors::PhotoError;
use crate::models::{Tag, TagCount};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

pub struct TagRepository;

impl TagRepository {
    /// Get or create the tag with this (normalized) name
    pub async fn upsert_tag(conn: &mut SqliteConnection, name: &str) -> Result<Tag, PhotoError> {
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name, created_at)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = excluded.name
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            log::error!("Failed to upsert tag {}: {}", name, e);
            PhotoError::DatabaseError(format!("Upsert tag failed: {}", e))
        })
    }

    /// Link tags to a photo, creating missing tags
    /// Links that already exist are kept as they are
    pub async fn attach_tags(
        conn: &mut SqliteConnection,
        photo_id: Uuid,
        names: &[String],
    ) -> Result<(), PhotoError> {
        for name in names {
            let tag = Self::upsert_tag(conn, name).await?;

            sqlx::query(
                r#"
                INSERT INTO photo_tags (photo_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT (photo_id, tag_id) DO NOTHING
                "#,
            )
            .bind(photo_id)
            .bind(tag.id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                log::error!("Failed to tag photo {} with {}: {}", photo_id, name, e);
                PhotoError::DatabaseError(format!("Attach tag failed: {}", e))
            })?;
        }

        Ok(())
    }

    /// Replace the tag set of a photo
    pub async fn replace_tags(
        conn: &mut SqliteConnection,
        photo_id: Uuid,
        names: &[String],
    ) -> Result<(), PhotoError> {
        sqlx::query("DELETE FROM photo_tags WHERE photo_id = $1")
            .bind(photo_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                log::error!("Failed to clear tags of photo {}: {}", photo_id, e);
                PhotoError::DatabaseError(e.to_string())
            })?;

        Self::attach_tags(conn, photo_id, names).await
    }

    /// Tag names of one photo, alphabetical
    pub async fn tags_for_photo(pool: &SqlitePool, photo_id: Uuid) -> Result<Vec<String>, PhotoError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT t.name
            FROM photo_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.photo_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(photo_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch tags for photo {}: {}", photo_id, e);
            PhotoError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Tag names for a batch of photos in one query
    pub async fn tags_for_photos(
        pool: &SqlitePool,
        photo_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<String>>, PhotoError> {
        let mut by_photo: HashMap<Uuid, Vec<String>> = HashMap::new();
        if photo_ids.is_empty() {
            return Ok(by_photo);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT pt.photo_id, t.name FROM photo_tags pt JOIN tags t ON t.id = pt.tag_id WHERE pt.photo_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in photo_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY t.name ASC");

        let rows: Vec<(Uuid, String)> = builder
            .build_query_as()
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch tags for {} photos: {}", photo_ids.len(), e);
                PhotoError::DatabaseError(e.to_string())
            })?;

        for (photo_id, name) in rows {
            by_photo.entry(photo_id).or_default().push(name);
        }

        Ok(by_photo)
    }

    /// All tags in use with their photo counts, most used first
    pub async fn list_with_counts(pool: &SqlitePool) -> Result<Vec<TagCount>, PhotoError> {
        sqlx::query_as::<_, TagCount>(
            r#"
            SELECT t.name, COUNT(pt.photo_id) AS photo_count
            FROM tags t
            JOIN photo_tags pt ON pt.tag_id = t.id
            GROUP BY t.id, t.name
            ORDER BY photo_count DESC, t.name ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to list tags: {}", e);
            PhotoError::DatabaseError(e.to_string())
        })
    }
}
