//! Seed the database with taxonomy, an admin account and the bundled catalog.
//!
//! Reads `DATABASE_URL`, `SEED_ADMIN_PASSWORD` and optionally
//! `SEED_ADMIN_EMAIL` and `LOG_FORMAT` from the environment.

use anyhow::Context;
use mediashelf_api::config::{env_or, required};
use mediashelf_api::logging::{self, LogFormat};
use mediashelf_api::seed::{self, SeedAdmin, DEFAULT_ADMIN_EMAIL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_format = env_or("LOG_FORMAT", LogFormat::Pretty)?;
    logging::init(log_format);

    let database_url = required("DATABASE_URL")?;
    let admin = SeedAdmin {
        email: env_or("SEED_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL.to_string())?,
        password: required("SEED_ADMIN_PASSWORD")?,
    };

    let pool = mediashelf_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    mediashelf_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let summary = seed::run(&pool, &admin).await.context("Seeding failed")?;
    tracing::info!(?summary, "Database seeded");

    pool.close().await;
    Ok(())
}
