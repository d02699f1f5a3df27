//! Repository for the `follows` table.

use mediashelf_core::pagination::PageRequest;
use mediashelf_core::types::DbId;
use sqlx::PgPool;

use crate::models::follow::FollowEntry;

/// Provides operations on the user follow graph.
pub struct FollowRepo;

impl FollowRepo {
    /// Create a follow edge. Returns `false` if it already existed.
    pub async fn follow(
        pool: &PgPool,
        follower_id: DbId,
        following_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, following_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a follow edge. Returns `true` if it existed.
    pub async fn unfollow(
        pool: &PgPool,
        follower_id: DbId,
        following_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
                .bind(follower_id)
                .bind(following_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `follower_id` follows `following_id`.
    pub async fn is_following(
        pool: &PgPool,
        follower_id: DbId,
        following_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(pool)
        .await
    }

    /// Users following `user_id`, most recent first, with the total count.
    pub async fn followers(
        pool: &PgPool,
        user_id: DbId,
        page: PageRequest,
    ) -> Result<(Vec<FollowEntry>, i64), sqlx::Error> {
        let items = sqlx::query_as::<_, FollowEntry>(
            "SELECT u.id AS user_id, u.username, u.display_name, u.avatar_url,
                    f.created_at AS followed_at
             FROM follows f
             JOIN users u ON u.id = f.follower_id
             WHERE f.following_id = $1
             ORDER BY f.created_at DESC, u.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE following_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Users that `user_id` follows, most recent first, with the total count.
    pub async fn following(
        pool: &PgPool,
        user_id: DbId,
        page: PageRequest,
    ) -> Result<(Vec<FollowEntry>, i64), sqlx::Error> {
        let items = sqlx::query_as::<_, FollowEntry>(
            "SELECT u.id AS user_id, u.username, u.display_name, u.avatar_url,
                    f.created_at AS followed_at
             FROM follows f
             JOIN users u ON u.id = f.following_id
             WHERE f.follower_id = $1
             ORDER BY f.created_at DESC, u.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }
}
