// src/db/photo_repository.rs
// DOCUMENTATION: Photo database operations
// PURPOSE: Handle CRUD and search queries for uploaded photos

use crate::errors::PhotoError;
use crate::models::{NewPhotoRecord, Pagination, Photo};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Escape LIKE wildcards so user input matches literally (paired with ESCAPE '\')
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Lowercased description and alt-text, the text matched by search
/// Folded here because SQLite's LOWER() and LIKE only fold ASCII
pub fn search_text(description: Option<&str>, alt_text: Option<&str>) -> String {
    [description, alt_text]
        .iter()
        .flatten()
        .map(|text| text.to_lowercase())
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct PhotoRepository;

impl PhotoRepository {
    /// Insert a photo row
    /// DOCUMENTATION: Runs on the caller's connection so the upload can share a transaction
    pub async fn create_photo(
        conn: &mut SqliteConnection,
        rec: &NewPhotoRecord,
    ) -> Result<Photo, PhotoError> {
        let now = Utc::now();
        let colors = if rec.dominant_colors.is_empty() {
            None
        } else {
            Some(Json(rec.dominant_colors.clone()))
        };

        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (
                id, owner_id, file_path, original_filename, content_type, file_size,
                description, alt_text, detected_text, dominant_colors,
                search_text, uploaded_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(rec.id)
        .bind(rec.owner_id)
        .bind(&rec.file_path)
        .bind(&rec.original_filename)
        .bind(&rec.content_type)
        .bind(rec.file_size)
        .bind(&rec.description)
        .bind(&rec.alt_text)
        .bind(&rec.detected_text)
        .bind(colors)
        .bind(search_text(rec.description.as_deref(), rec.alt_text.as_deref()))
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            log::error!("Failed to create photo: {}", e);
            PhotoError::DatabaseError(format!("Create photo failed: {}", e))
        })?;

        Ok(photo)
    }

    pub async fn get_by_id(pool: &SqlitePool, id: Uuid) -> Result<Photo, PhotoError> {
        sqlx::query_as::<_, Photo>("SELECT * FROM photos WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch photo {}: {}", id, e);
                PhotoError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| PhotoError::NotFound(format!("photo {}", id)))
    }

    /// Newest photos first, with the total row count
    pub async fn list_recent(
        pool: &SqlitePool,
        page: Pagination,
    ) -> Result<(Vec<Photo>, i64), PhotoError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM photos")
            .fetch_one(pool)
            .await
            .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;

        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT * FROM photos
            ORDER BY uploaded_at DESC, rowid DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to list photos: {}", e);
            PhotoError::DatabaseError(e.to_string())
        })?;

        Ok((photos, total))
    }

    /// One owner's photos, newest first
    pub async fn list_by_owner(
        pool: &SqlitePool,
        owner_id: Uuid,
        page: Pagination,
    ) -> Result<(Vec<Photo>, i64), PhotoError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM photos WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await
            .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;

        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT * FROM photos
            WHERE owner_id = $1
            ORDER BY uploaded_at DESC, rowid DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to list photos of {}: {}", owner_id, e);
            PhotoError::DatabaseError(e.to_string())
        })?;

        Ok((photos, total))
    }

    /// Case-insensitive substring search over tag names, description and alt-text
    /// DOCUMENTATION: Each matching photo appears once, newest upload first
    pub async fn search(
        pool: &SqlitePool,
        query: &str,
        page: Pagination,
    ) -> Result<(Vec<Photo>, i64), PhotoError> {
        let pattern = like_pattern(query);

        let where_clause = r#"
            WHERE p.search_text LIKE $1 ESCAPE '\'
               OR EXISTS (
                    SELECT 1
                    FROM photo_tags pt
                    JOIN tags t ON t.id = pt.tag_id
                    WHERE pt.photo_id = p.id AND t.name LIKE $1 ESCAPE '\'
               )
        "#;

        let count_sql = format!("SELECT COUNT(*) FROM photos p {}", where_clause);
        let (total,): (i64,) = sqlx::query_as(&count_sql)
            .bind(&pattern)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Search count query error: {}", e);
                PhotoError::DatabaseError(e.to_string())
            })?;

        let select_sql = format!(
            "SELECT p.* FROM photos p {} ORDER BY p.uploaded_at DESC, p.rowid DESC LIMIT $2 OFFSET $3",
            where_clause
        );
        let photos = sqlx::query_as::<_, Photo>(&select_sql)
            .bind(&pattern)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Search query error: {}", e);
                PhotoError::DatabaseError(e.to_string())
            })?;

        log::debug!("Search {:?} matched {} photos", query, total);
        Ok((photos, total))
    }

    /// Set or clear the description; alt-text is never touched here
    pub async fn update_description(
        conn: &mut SqliteConnection,
        id: Uuid,
        description: Option<&str>,
    ) -> Result<(), PhotoError> {
        let (alt_text,): (Option<String>,) =
            sqlx::query_as("SELECT alt_text FROM photos WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| PhotoError::DatabaseError(e.to_string()))?
                .ok_or_else(|| PhotoError::NotFound(format!("photo {}", id)))?;

        sqlx::query(
            "UPDATE photos SET description = $1, search_text = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(description)
        .bind(search_text(description, alt_text.as_deref()))
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            log::error!("Failed to update photo {}: {}", id, e);
            PhotoError::DatabaseError(format!("Update photo failed: {}", e))
        })?;

        Ok(())
    }

    pub async fn touch(conn: &mut SqliteConnection, id: Uuid) -> Result<(), PhotoError> {
        sqlx::query("UPDATE photos SET updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Stored file names of everything a user owns
    pub async fn file_paths_for_owner(
        pool: &SqlitePool,
        owner_id: Uuid,
    ) -> Result<Vec<String>, PhotoError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT file_path FROM photos WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_all(pool)
            .await
            .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Delete a photo row; comments and tag links cascade
    pub async fn delete_photo(pool: &SqlitePool, id: Uuid) -> Result<(), PhotoError> {
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to delete photo {}: {}", id, e);
                PhotoError::DatabaseError(format!("Delete photo failed: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(PhotoError::NotFound(format!("photo {}", id)));
        }

        Ok(())
    }
}
