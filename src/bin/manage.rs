// src/bin/manage.rs
// DOCUMENTATION: Management CLI
// PURPOSE: Create the schema and load demo data without starting the server

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use photoshare::config::{init_db_pool, Config};
use photoshare::db::init_schema;
use photoshare::services::{SeedService, UploadStore, DEMO_PASSWORD};

#[derive(Parser, Debug)]
#[clap(name = "photoshare-manage")]
#[clap(about = "Administrative commands for the photoshare service")]
struct Args {
    /// Overrides DATABASE_URL
    #[clap(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create all tables and indexes (safe to re-run)
    InitDb,
    /// Create demo users, placeholder photos, tags and comments
    SeedDemo,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,sqlx=warn");
    }
    env_logger::init();

    let pool = init_db_pool(&config)
        .await
        .with_context(|| format!("cannot open database {}", config.database_url))?;

    // Both commands need the tables
    init_schema(&pool).await.context("schema initialization failed")?;

    match args.command {
        Command::InitDb => {
            log::info!("Schema ready in {}", config.database_url);
            println!("Database initialized: {}", config.database_url);
        }
        Command::SeedDemo => {
            let store = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes);
            let summary = SeedService::seed_demo(&pool, &store, config.bcrypt_cost)
                .await
                .context("seeding demo data failed")?;

            println!(
                "Created {} users, {} photos, {} comments (demo password: {})",
                summary.users_created, summary.photos_created, summary.comments_created, DEMO_PASSWORD
            );
        }
    }

    pool.close().await;
    Ok(())
}
