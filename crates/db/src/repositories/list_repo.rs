//! Repository for `media_lists` and `media_list_items`.
//!
//! Item positions are 1-based and contiguous. Appends take `MAX(position) + 1`;
//! removals and reorders rewrite positions inside a transaction so the
//! sequence stays gap-free. Every item mutation first locks the parent list
//! row, so mutations of one list are serialized.

use mediashelf_core::error::CoreError;
use mediashelf_core::lists::validate_reorder;
use mediashelf_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::list::{CreateMediaList, MediaList, MediaListItem, UpdateMediaList};

/// Name of the unique list-name-per-user constraint.
pub const UNIQUE_USER_NAME: &str = "uq_media_lists_user_name";

/// Name of the unique media-per-list constraint.
pub const UNIQUE_LIST_MEDIA: &str = "uq_media_list_items_list_media";

/// Select list producing [`MediaList`] rows.
const SELECT_LIST: &str = "SELECT l.id, l.user_id, l.name, l.description, l.is_public,
        (SELECT COUNT(*) FROM media_list_items i WHERE i.list_id = l.id) AS item_count,
        l.created_at, l.updated_at
     FROM media_lists l";

/// Select list producing [`MediaListItem`] rows.
const SELECT_ITEM: &str = "SELECT i.id, i.list_id, i.media_id, i.position, i.note, i.added_at,
        m.media_type, m.title AS media_title, m.cover_image_url
     FROM media_list_items i
     JOIN media m ON m.id = i.media_id";

/// Result of [`ListRepo::reorder`].
#[derive(Debug)]
pub enum ReorderOutcome {
    Reordered,
    /// The requested order is not a permutation of the list's items at the
    /// time the lock was taken. Nothing was written.
    Rejected(CoreError),
}

/// Provides CRUD operations for media lists and their items.
pub struct ListRepo;

impl ListRepo {
    /// Insert a list, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateMediaList,
    ) -> Result<MediaList, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO media_lists (user_id, name, description, is_public)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_public)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a list by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MediaList>, sqlx::Error> {
        let query = format!("{SELECT_LIST} WHERE l.id = $1");
        sqlx::query_as::<_, MediaList>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's lists, most recently updated first. Private lists are
    /// only included when `include_private` is `true`.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        include_private: bool,
    ) -> Result<Vec<MediaList>, sqlx::Error> {
        let query = format!(
            "{SELECT_LIST}
             WHERE l.user_id = $1 AND ($2 OR l.is_public)
             ORDER BY l.updated_at DESC, l.id DESC"
        );
        sqlx::query_as::<_, MediaList>(&query)
            .bind(user_id)
            .bind(include_private)
            .fetch_all(pool)
            .await
    }

    /// Update a list. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMediaList,
    ) -> Result<Option<MediaList>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE media_lists SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_public = COALESCE($4, is_public)
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.is_public)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Delete a list and its items. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM media_lists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// All items of a list in position order.
    pub async fn items(pool: &PgPool, list_id: DbId) -> Result<Vec<MediaListItem>, sqlx::Error> {
        let query = format!("{SELECT_ITEM} WHERE i.list_id = $1 ORDER BY i.position, i.id");
        sqlx::query_as::<_, MediaListItem>(&query)
            .bind(list_id)
            .fetch_all(pool)
            .await
    }

    /// Media ids of a list in position order.
    pub async fn item_media_ids(pool: &PgPool, list_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT media_id FROM media_list_items WHERE list_id = $1 ORDER BY position, id",
        )
        .bind(list_id)
        .fetch_all(pool)
        .await
    }

    /// Append a media entry to the end of a list.
    ///
    /// Fails with a unique violation on [`UNIQUE_LIST_MEDIA`] if the media is
    /// already in the list.
    pub async fn add_item(
        pool: &PgPool,
        list_id: DbId,
        media_id: DbId,
        note: Option<&str>,
    ) -> Result<MediaListItem, sqlx::Error> {
        let mut tx = pool.begin().await?;
        lock_list(&mut tx, list_id).await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO media_list_items (list_id, media_id, position, note)
             VALUES ($1, $2,
                     (SELECT COALESCE(MAX(position), 0) + 1
                        FROM media_list_items WHERE list_id = $1),
                     $3)
             RETURNING id",
        )
        .bind(list_id)
        .bind(media_id)
        .bind(note)
        .fetch_one(&mut *tx)
        .await?;

        touch_list(&mut tx, list_id).await?;
        tx.commit().await?;

        let query = format!("{SELECT_ITEM} WHERE i.id = $1");
        sqlx::query_as::<_, MediaListItem>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Remove a media entry from a list and close the gap in positions.
    /// Returns `true` if the item existed.
    pub async fn remove_item(
        pool: &PgPool,
        list_id: DbId,
        media_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        lock_list(&mut tx, list_id).await?;

        let removed: Option<i32> = sqlx::query_scalar(
            "DELETE FROM media_list_items WHERE list_id = $1 AND media_id = $2 RETURNING position",
        )
        .bind(list_id)
        .bind(media_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(position) = removed else {
            return Ok(false);
        };

        sqlx::query(
            "UPDATE media_list_items SET position = position - 1
             WHERE list_id = $1 AND position > $2",
        )
        .bind(list_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;

        touch_list(&mut tx, list_id).await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Rewrite item positions so that `media_ids[i]` lands at position `i + 1`.
    ///
    /// `media_ids` is checked against the list's items while the list row is
    /// locked; anything but an exact permutation is rejected without writing.
    pub async fn reorder(
        pool: &PgPool,
        list_id: DbId,
        media_ids: &[DbId],
    ) -> Result<ReorderOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        lock_list(&mut tx, list_id).await?;

        let current: Vec<DbId> = sqlx::query_scalar(
            "SELECT media_id FROM media_list_items WHERE list_id = $1 ORDER BY position, id",
        )
        .bind(list_id)
        .fetch_all(&mut *tx)
        .await?;
        if let Err(err) = validate_reorder(&current, media_ids) {
            tx.rollback().await?;
            return Ok(ReorderOutcome::Rejected(err));
        }

        sqlx::query(
            "UPDATE media_list_items i
             SET position = o.ord::int
             FROM UNNEST($2::bigint[]) WITH ORDINALITY AS o(media_id, ord)
             WHERE i.list_id = $1 AND i.media_id = o.media_id",
        )
        .bind(list_id)
        .bind(media_ids)
        .execute(&mut *tx)
        .await?;

        touch_list(&mut tx, list_id).await?;
        tx.commit().await?;
        Ok(ReorderOutcome::Reordered)
    }
}

/// Take the row lock on a list for the rest of the transaction.
async fn lock_list(conn: &mut PgConnection, list_id: DbId) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM media_lists WHERE id = $1 FOR UPDATE")
        .bind(list_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Bump `updated_at` on a list after its items change.
async fn touch_list(conn: &mut PgConnection, list_id: DbId) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE media_lists SET updated_at = NOW() WHERE id = $1")
        .bind(list_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
