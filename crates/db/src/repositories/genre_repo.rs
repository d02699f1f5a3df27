//! Repositories for the `genres` and `platforms` lookup tables.

use sqlx::PgPool;

use crate::models::genre::{Genre, Platform};

/// Column list shared by both taxonomy tables.
const COLUMNS: &str = "id, name, slug, created_at";

/// Provides CRUD operations for genres.
pub struct GenreRepo;

impl GenreRepo {
    /// Insert a genre, returning the created row.
    pub async fn create(pool: &PgPool, name: &str, slug: &str) -> Result<Genre, sqlx::Error> {
        let query = format!("INSERT INTO genres (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Genre>(&query)
            .bind(name)
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    /// Insert a genre unless one with the same slug exists; returns the row either way.
    pub async fn upsert(pool: &PgPool, name: &str, slug: &str) -> Result<Genre, sqlx::Error> {
        let query = format!(
            "INSERT INTO genres (name, slug) VALUES ($1, $2)
             ON CONFLICT (slug) DO UPDATE SET name = genres.name
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Genre>(&query)
            .bind(name)
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    /// List all genres alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Genre>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM genres ORDER BY name");
        sqlx::query_as::<_, Genre>(&query).fetch_all(pool).await
    }
}

/// Provides CRUD operations for platforms.
pub struct PlatformRepo;

impl PlatformRepo {
    /// Insert a platform, returning the created row.
    pub async fn create(pool: &PgPool, name: &str, slug: &str) -> Result<Platform, sqlx::Error> {
        let query =
            format!("INSERT INTO platforms (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Platform>(&query)
            .bind(name)
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    /// Insert a platform unless one with the same slug exists; returns the row either way.
    pub async fn upsert(pool: &PgPool, name: &str, slug: &str) -> Result<Platform, sqlx::Error> {
        let query = format!(
            "INSERT INTO platforms (name, slug) VALUES ($1, $2)
             ON CONFLICT (slug) DO UPDATE SET name = platforms.name
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Platform>(&query)
            .bind(name)
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    /// List all platforms alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Platform>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM platforms ORDER BY name");
        sqlx::query_as::<_, Platform>(&query).fetch_all(pool).await
    }
}
