// src/db/schema.rs
// DOCUMENTATION: Table definitions
// PURPOSE: Create the schema on an empty database (init-db command and startup)

use crate::errors::PhotoError;
use sqlx::SqlitePool;

/// DDL statements, in dependency order
/// Every statement is idempotent so init can run on every start
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BLOB PRIMARY KEY NOT NULL,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        api_token TEXT UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS photos (
        id BLOB PRIMARY KEY NOT NULL,
        owner_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        file_path TEXT NOT NULL,
        original_filename TEXT,
        content_type TEXT NOT NULL,
        file_size INTEGER NOT NULL,
        description TEXT,
        alt_text TEXT,
        detected_text TEXT,
        dominant_colors TEXT,
        search_text TEXT NOT NULL DEFAULT '',
        uploaded_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_photos_owner ON photos(owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_photos_uploaded_at ON photos(uploaded_at)",
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS photo_tags (
        photo_id BLOB NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (photo_id, tag_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_photo_tags_tag ON photo_tags(tag_id)",
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id BLOB PRIMARY KEY NOT NULL,
        photo_id BLOB NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
        author_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        body TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_comments_photo ON comments(photo_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_author ON comments(author_id)",
];

/// Create all tables and indexes that do not exist yet
pub async fn init_schema(pool: &SqlitePool) -> Result<(), PhotoError> {
    let mut tx = pool.begin().await.map_err(|e| {
        log::error!("Failed to open schema transaction: {}", e);
        PhotoError::DatabaseError(e.to_string())
    })?;

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Schema statement failed: {}", e);
                PhotoError::DatabaseError(format!("Schema init failed: {}", e))
            })?;
    }

    tx.commit()
        .await
        .map_err(|e| PhotoError::DatabaseError(e.to_string()))?;

    log::info!("Database schema ready ({} statements)", SCHEMA.len());
    Ok(())
}
