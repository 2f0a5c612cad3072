// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string
    /// Format: sqlite://path/to/file.db
    pub database_url: String,

    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8080)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Directory uploaded images are written to
    pub upload_dir: PathBuf,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,

    /// Path of the vision API credentials file (GOOGLE_APPLICATION_CREDENTIALS)
    pub google_credentials_path: Option<PathBuf>,

    /// Vision API annotate endpoint
    pub vision_endpoint: String,

    /// How many detected labels become tags
    pub vision_max_labels: usize,

    /// Minimum confidence for labels and objects
    pub vision_score_threshold: f32,

    /// Timeout for one annotate call, in seconds
    pub vision_timeout_secs: u64,

    /// bcrypt work factor for password hashes
    pub bcrypt_cost: u32,

    /// Maximum connections in database pool
    pub db_max_connections: u32,

    /// Connection timeout in seconds
    pub db_connection_timeout: u64,

    /// Create missing tables on startup
    pub auto_init_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite://photoshare.db".to_string(),
            server_address: "127.0.0.1".to_string(),
            server_port: 8080,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
            google_credentials_path: None,
            vision_endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            vision_max_labels: 10,
            vision_score_threshold: 0.5,
            vision_timeout_secs: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            db_max_connections: 5,
            db_connection_timeout: 30,
            auto_init_schema: true,
        }
    }
}

/// Read an env var and parse it, falling back to `default` when unset or malformed
fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring malformed value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        Config {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),

            server_address: env::var("SERVER_ADDRESS").unwrap_or(defaults.server_address),

            server_port: parse_var("SERVER_PORT", defaults.server_port),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),

            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),

            google_credentials_path: env::var("GOOGLE_APPLICATION_CREDENTIALS")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),

            vision_endpoint: env::var("VISION_ENDPOINT").unwrap_or(defaults.vision_endpoint),

            vision_max_labels: parse_var("VISION_MAX_LABELS", defaults.vision_max_labels),

            vision_score_threshold: parse_var(
                "VISION_SCORE_THRESHOLD",
                defaults.vision_score_threshold,
            ),

            vision_timeout_secs: parse_var("VISION_TIMEOUT_SECS", defaults.vision_timeout_secs),

            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost),

            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections),

            db_connection_timeout: parse_var(
                "DB_CONNECTION_TIMEOUT",
                defaults.db_connection_timeout,
            ),

            auto_init_schema: parse_var("AUTO_INIT_SCHEMA", defaults.auto_init_schema),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err("DATABASE_URL is required".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("MAX_UPLOAD_BYTES must be greater than zero".to_string());
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                self.bcrypt_cost
            ));
        }

        if self.google_credentials_path.is_none() {
            log::warn!(
                "GOOGLE_APPLICATION_CREDENTIALS not configured - uploads will not be annotated"
            );
        }

        Ok(())
    }
}
