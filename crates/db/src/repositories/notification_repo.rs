//! Repository for the `notifications` table.

use mediashelf_core::pagination::PageRequest;
use mediashelf_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{CreateNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, kind, title, message, actor_id, media_id, data, \
                       is_read, read_at, created_at";

/// Provides CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a notification for a single recipient.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (user_id, kind, title, message, actor_id, media_id, data)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(&input.kind)
            .bind(&input.title)
            .bind(&input.message)
            .bind(input.actor_id)
            .bind(input.media_id)
            .bind(&input.data)
            .fetch_one(pool)
            .await
    }

    /// Create the same notification for every follower of `followed_id`.
    ///
    /// Returns the number of notifications created.
    pub async fn create_for_followers(
        pool: &PgPool,
        followed_id: DbId,
        input: &CreateNotification,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, message, actor_id, media_id, data)
             SELECT f.follower_id, $2, $3, $4, $5, $6, $7
             FROM follows f
             WHERE f.following_id = $1",
        )
        .bind(followed_id)
        .bind(&input.kind)
        .bind(&input.title)
        .bind(&input.message)
        .bind(input.actor_id)
        .bind(input.media_id)
        .bind(&input.data)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List notifications for a user, newest first, with the total count.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<(Vec<Notification>, i64), sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM notifications WHERE user_id = $1 {filter}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification belongs to the given user. Marking
    /// an already-read notification is a no-op that still returns `true`.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read for a user.
    ///
    /// Returns the number of notifications that were marked read.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Get the number of unread notifications for a user.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Delete a notification owned by `user_id`. Returns `true` if it existed.
    pub async fn delete(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
