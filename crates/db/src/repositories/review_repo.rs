//! Repository for the `media_reviews` table.

use mediashelf_core::pagination::PageRequest;
use mediashelf_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CreateReview, Review, ReviewFilter, UpdateReview};

/// Name of the one-review-per-user-per-media constraint.
pub const UNIQUE_USER_MEDIA: &str = "uq_media_reviews_user_media";

/// Joined select list producing [`Review`] rows.
const SELECT_REVIEW: &str = "SELECT v.id, v.user_id, u.username, v.media_id, m.title AS media_title,
        v.title, v.content, v.contains_spoilers, v.created_at, v.updated_at
     FROM media_reviews v
     JOIN users u ON u.id = v.user_id
     JOIN media m ON m.id = v.media_id";

/// Shared `WHERE` clause for listing; binds `$1..$2`.
const LIST_FILTER: &str =
    "($1::bigint IS NULL OR v.media_id = $1) AND ($2::bigint IS NULL OR v.user_id = $2)";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review, returning the joined row.
    ///
    /// Fails with a unique violation on [`UNIQUE_USER_MEDIA`] if the user has
    /// already reviewed the media.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateReview,
    ) -> Result<Review, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO media_reviews (user_id, media_id, title, content, contains_spoilers)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(user_id)
        .bind(input.media_id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.contains_spoilers)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a review by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("{SELECT_REVIEW} WHERE v.id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the review a user wrote for a media entry, if any.
    pub async fn find_by_user_and_media(
        pool: &PgPool,
        user_id: DbId,
        media_id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("{SELECT_REVIEW} WHERE v.user_id = $1 AND v.media_id = $2");
        sqlx::query_as::<_, Review>(&query)
            .bind(user_id)
            .bind(media_id)
            .fetch_optional(pool)
            .await
    }

    /// List reviews, newest first. Returns the page and the total match count.
    pub async fn list(
        pool: &PgPool,
        filter: ReviewFilter,
        page: PageRequest,
    ) -> Result<(Vec<Review>, i64), sqlx::Error> {
        let query = format!(
            "{SELECT_REVIEW}
             WHERE {LIST_FILTER}
             ORDER BY v.created_at DESC, v.id DESC
             LIMIT $3 OFFSET $4"
        );
        let items = sqlx::query_as::<_, Review>(&query)
            .bind(filter.media_id)
            .bind(filter.user_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM media_reviews v WHERE {LIST_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(filter.media_id)
            .bind(filter.user_id)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Update a review. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE media_reviews SET
                title = CASE WHEN $5 THEN $2 ELSE title END,
                content = COALESCE($3, content),
                contains_spoilers = COALESCE($4, contains_spoilers)
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.title.as_ref().and_then(|t| t.as_deref()))
        .bind(&input.content)
        .bind(input.contains_spoilers)
        .bind(input.title.is_some())
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Delete a review. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM media_reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
