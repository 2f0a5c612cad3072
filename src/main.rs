// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, upload store, annotator and start HTTP server

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use photoshare::config::{self, Config};
use photoshare::db::init_schema;
use photoshare::handlers;
use photoshare::services::{build_annotator, UploadStore};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    log::info!("Starting photoshare...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if config.auto_init_schema {
        if let Err(e) = init_schema(&pool).await {
            log::error!("Failed to initialize schema: {}", e);
            std::process::exit(1);
        }
    }

    // 5. Upload directory and vision annotator
    let store = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes);
    if let Err(e) = store.ensure_root().await {
        log::error!("Upload directory unusable: {}", e);
        std::process::exit(1);
    }
    log::info!("Storing uploads in {}", store.root().display());

    let annotator = build_annotator(&config);

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(annotator.clone()))
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::routes)
    })
    .bind(&server_addr)?
    .run()
    .await
}
