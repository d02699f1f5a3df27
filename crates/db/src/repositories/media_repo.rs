//! Repository for the `media` table and its genre/platform associations.

use mediashelf_core::pagination::PageRequest;
use mediashelf_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use super::like_pattern;
use crate::models::media::{CreateMedia, Media, MediaFilter, UpdateMedia};

/// Enriched select list: base columns plus aggregates and taxonomy names.
const SELECT_MEDIA: &str = "SELECT m.id, m.media_type, m.title, m.description, m.release_date,
        m.cover_image_url, m.created_by, m.director, m.runtime_minutes, m.developer,
        m.publisher, m.author, m.volumes, m.chapters,
        (SELECT ROUND(AVG(r.score)::numeric, 1)::float8
           FROM media_ratings r WHERE r.media_id = m.id) AS average_rating,
        (SELECT COUNT(*) FROM media_ratings r WHERE r.media_id = m.id) AS rating_count,
        (SELECT COUNT(*) FROM media_reviews v WHERE v.media_id = m.id) AS review_count,
        ARRAY(SELECT g.name FROM genres g
              JOIN media_genres mg ON mg.genre_id = g.id
              WHERE mg.media_id = m.id ORDER BY g.name) AS genres,
        ARRAY(SELECT p.name FROM platforms p
              JOIN media_platforms mp ON mp.platform_id = p.id
              WHERE mp.media_id = m.id ORDER BY p.name) AS platforms,
        m.created_at, m.updated_at
     FROM media m";

/// Shared `WHERE` clause for listing; binds `$1..$4`.
const LIST_FILTER: &str = "($1::text IS NULL OR m.media_type = $1)
       AND ($2::text IS NULL OR EXISTS (
            SELECT 1 FROM media_genres mg JOIN genres g ON g.id = mg.genre_id
            WHERE mg.media_id = m.id AND g.slug = $2))
       AND ($3::text IS NULL OR EXISTS (
            SELECT 1 FROM media_platforms mp JOIN platforms p ON p.id = mp.platform_id
            WHERE mp.media_id = m.id AND p.slug = $3))
       AND ($4::text IS NULL OR m.title ILIKE $4)";

/// Provides CRUD operations for media entries.
pub struct MediaRepo;

impl MediaRepo {
    /// Insert a media entry and its genre/platform links in one transaction,
    /// returning the enriched row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMedia,
        created_by: Option<DbId>,
    ) -> Result<Media, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO media (media_type, title, description, release_date, cover_image_url,
                                created_by, director, runtime_minutes, developer, publisher,
                                author, volumes, chapters)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING id",
        )
        .bind(&input.media_type)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.release_date)
        .bind(&input.cover_image_url)
        .bind(created_by)
        .bind(&input.attributes.director)
        .bind(input.attributes.runtime_minutes)
        .bind(&input.attributes.developer)
        .bind(&input.attributes.publisher)
        .bind(&input.attributes.author)
        .bind(input.attributes.volumes)
        .bind(input.attributes.chapters)
        .fetch_one(&mut *tx)
        .await?;

        replace_genres(&mut tx, id, &input.genre_ids).await?;
        replace_platforms(&mut tx, id, &input.platform_ids).await?;

        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find an enriched media entry by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Media>, sqlx::Error> {
        let query = format!("{SELECT_MEDIA} WHERE m.id = $1");
        sqlx::query_as::<_, Media>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return the creator of a media entry, or `None` if the entry does not
    /// exist. The inner `Option` is `None` when the creator account was deleted.
    pub async fn find_owner(pool: &PgPool, id: DbId) -> Result<Option<Option<DbId>>, sqlx::Error> {
        sqlx::query_scalar("SELECT created_by FROM media WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return the title of a media entry if it exists.
    pub async fn find_title(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT title FROM media WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a media entry of the given type with this exact title exists.
    pub async fn exists_with_title(
        pool: &PgPool,
        media_type: &str,
        title: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM media WHERE media_type = $1 AND LOWER(title) = LOWER($2))",
        )
        .bind(media_type)
        .bind(title)
        .fetch_one(pool)
        .await
    }

    /// List media matching `filter`. Returns the page and the total match count.
    pub async fn list(
        pool: &PgPool,
        filter: &MediaFilter,
        page: PageRequest,
    ) -> Result<(Vec<Media>, i64), sqlx::Error> {
        let search = filter.search.as_deref().map(like_pattern);
        let order = filter.order.sql_keyword();

        let query = format!(
            "{SELECT_MEDIA}
             WHERE {LIST_FILTER}
             ORDER BY {sort} {order} NULLS LAST, m.id {order}
             LIMIT $5 OFFSET $6",
            sort = filter.sort.sql_expr(),
        );
        let items = sqlx::query_as::<_, Media>(&query)
            .bind(&filter.media_type)
            .bind(&filter.genre_slug)
            .bind(&filter.platform_slug)
            .bind(&search)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM media m WHERE {LIST_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&filter.media_type)
            .bind(&filter.genre_slug)
            .bind(&filter.platform_slug)
            .bind(&search)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Update a media entry. Only non-`None` fields are applied; taxonomy
    /// lists, when present, replace the existing links.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMedia,
    ) -> Result<Option<Media>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE media SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                release_date = COALESCE($4, release_date),
                cover_image_url = COALESCE($5, cover_image_url),
                director = COALESCE($6, director),
                runtime_minutes = COALESCE($7, runtime_minutes),
                developer = COALESCE($8, developer),
                publisher = COALESCE($9, publisher),
                author = COALESCE($10, author),
                volumes = COALESCE($11, volumes),
                chapters = COALESCE($12, chapters)
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.release_date)
        .bind(&input.cover_image_url)
        .bind(&input.attributes.director)
        .bind(input.attributes.runtime_minutes)
        .bind(&input.attributes.developer)
        .bind(&input.attributes.publisher)
        .bind(&input.attributes.author)
        .bind(input.attributes.volumes)
        .bind(input.attributes.chapters)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(ref genre_ids) = input.genre_ids {
            replace_genres(&mut tx, id, genre_ids).await?;
        }
        if let Some(ref platform_ids) = input.platform_ids {
            replace_platforms(&mut tx, id, platform_ids).await?;
        }

        tx.commit().await?;
        Self::find_by_id(pool, id).await
    }

    /// Delete a media entry. Ratings, reviews, list items and taxonomy links
    /// cascade. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Media type string of an entry, used to validate type-specific updates.
    pub async fn find_type(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT media_type FROM media WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Replace all genre links of a media entry. Unknown genre ids fail with a
/// foreign-key violation.
async fn replace_genres(
    conn: &mut PgConnection,
    media_id: DbId,
    genre_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM media_genres WHERE media_id = $1")
        .bind(media_id)
        .execute(&mut *conn)
        .await?;
    if !genre_ids.is_empty() {
        sqlx::query(
            "INSERT INTO media_genres (media_id, genre_id)
             SELECT $1, UNNEST($2::bigint[])
             ON CONFLICT DO NOTHING",
        )
        .bind(media_id)
        .bind(genre_ids)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Replace all platform links of a media entry.
async fn replace_platforms(
    conn: &mut PgConnection,
    media_id: DbId,
    platform_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM media_platforms WHERE media_id = $1")
        .bind(media_id)
        .execute(&mut *conn)
        .await?;
    if !platform_ids.is_empty() {
        sqlx::query(
            "INSERT INTO media_platforms (media_id, platform_id)
             SELECT $1, UNNEST($2::bigint[])
             ON CONFLICT DO NOTHING",
        )
        .bind(media_id)
        .bind(platform_ids)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
