// src/config/db.rs
// DOCUMENTATION: Database connection pool initialization
// PURPOSE: Setup and manage SQLite connection pool

use crate::config::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Initialize SQLite connection pool
/// DOCUMENTATION: Creates connection pool with optimal settings
/// Called once during application startup in main.rs
/// Returns pool that is used for all database operations
pub async fn init_db_pool(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    log::info!("Initializing database pool: {}", config.database_url);

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        // Cascading deletes depend on this
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(config.db_connection_timeout));

    let pool = SqlitePoolOptions::new()
        // Maximum concurrent connections
        .max_connections(config.db_max_connections)
        // Timeout waiting for connection from pool
        .acquire_timeout(Duration::from_secs(config.db_connection_timeout))
        // Connection idle timeout (5 minutes)
        .idle_timeout(Duration::from_secs(300))
        // Connection lifetime (30 minutes before recycle)
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(options)
        .await?;

    // Verify connection works
    sqlx::query("SELECT 1").execute(&pool).await?;

    log::info!("Database pool initialized successfully");
    Ok(pool)
}

/// Single-connection in-memory pool
/// Every connection to `sqlite::memory:` opens a fresh database, so the pool
/// must hold exactly one connection and never recycle it.
pub async fn init_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}
