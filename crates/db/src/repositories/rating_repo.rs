//! Repository for the `media_ratings` table.

use mediashelf_core::pagination::PageRequest;
use mediashelf_core::types::DbId;
use sqlx::PgPool;

use crate::models::rating::{Rating, RatingFilter};

/// Name of the one-rating-per-user-per-media constraint.
pub const UNIQUE_USER_MEDIA: &str = "uq_media_ratings_user_media";

/// Joined select list producing [`Rating`] rows.
const SELECT_RATING: &str = "SELECT r.id, r.user_id, u.username, r.media_id, m.title AS media_title,
        r.score, r.created_at, r.updated_at
     FROM media_ratings r
     JOIN users u ON u.id = r.user_id
     JOIN media m ON m.id = r.media_id";

/// Shared `WHERE` clause for listing; binds `$1..$2`.
const LIST_FILTER: &str =
    "($1::bigint IS NULL OR r.media_id = $1) AND ($2::bigint IS NULL OR r.user_id = $2)";

/// Provides CRUD operations for ratings.
pub struct RatingRepo;

impl RatingRepo {
    /// Insert a rating, returning the joined row.
    ///
    /// Fails with a unique violation on [`UNIQUE_USER_MEDIA`] if the user has
    /// already rated the media.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        media_id: DbId,
        score: i16,
    ) -> Result<Rating, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO media_ratings (user_id, media_id, score)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(user_id)
        .bind(media_id)
        .bind(score)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a rating by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Rating>, sqlx::Error> {
        let query = format!("{SELECT_RATING} WHERE r.id = $1");
        sqlx::query_as::<_, Rating>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the rating a user gave a media entry, if any.
    pub async fn find_by_user_and_media(
        pool: &PgPool,
        user_id: DbId,
        media_id: DbId,
    ) -> Result<Option<Rating>, sqlx::Error> {
        let query = format!("{SELECT_RATING} WHERE r.user_id = $1 AND r.media_id = $2");
        sqlx::query_as::<_, Rating>(&query)
            .bind(user_id)
            .bind(media_id)
            .fetch_optional(pool)
            .await
    }

    /// List ratings, newest first. Returns the page and the total match count.
    pub async fn list(
        pool: &PgPool,
        filter: RatingFilter,
        page: PageRequest,
    ) -> Result<(Vec<Rating>, i64), sqlx::Error> {
        let query = format!(
            "{SELECT_RATING}
             WHERE {LIST_FILTER}
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT $3 OFFSET $4"
        );
        let items = sqlx::query_as::<_, Rating>(&query)
            .bind(filter.media_id)
            .bind(filter.user_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM media_ratings r WHERE {LIST_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(filter.media_id)
            .bind(filter.user_id)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Change a rating's score. Returns `None` if no row with `id` exists.
    pub async fn update_score(
        pool: &PgPool,
        id: DbId,
        score: i16,
    ) -> Result<Option<Rating>, sqlx::Error> {
        let result = sqlx::query("UPDATE media_ratings SET score = $2 WHERE id = $1")
            .bind(id)
            .bind(score)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Delete a rating. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM media_ratings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
