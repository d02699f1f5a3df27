//! Media catalog model and DTOs.

use chrono::NaiveDate;
use mediashelf_core::media::{MediaAttributes, MediaSort, SortOrder};
use mediashelf_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A media row enriched with rating/review aggregates and taxonomy names.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: DbId,
    pub media_type: String,
    pub title: String,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub cover_image_url: Option<String>,
    pub created_by: Option<DbId>,
    pub director: Option<String>,
    pub runtime_minutes: Option<i32>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub author: Option<String>,
    pub volumes: Option<i32>,
    pub chapters: Option<i32>,
    /// Mean score rounded to one decimal, `None` when unrated.
    pub average_rating: Option<f64>,
    pub rating_count: i64,
    pub review_count: i64,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a media entry.
#[derive(Debug, Clone)]
pub struct CreateMedia {
    pub media_type: String,
    pub title: String,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub cover_image_url: Option<String>,
    pub attributes: MediaAttributes,
    pub genre_ids: Vec<DbId>,
    pub platform_ids: Vec<DbId>,
}

/// DTO for updating a media entry. `None` leaves a column unchanged;
/// `Some` taxonomy id lists replace the existing associations.
#[derive(Debug, Clone, Default)]
pub struct UpdateMedia {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub cover_image_url: Option<String>,
    pub attributes: MediaAttributes,
    pub genre_ids: Option<Vec<DbId>>,
    pub platform_ids: Option<Vec<DbId>>,
}

/// Filters for media listing.
#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    pub media_type: Option<String>,
    pub genre_slug: Option<String>,
    pub platform_slug: Option<String>,
    pub search: Option<String>,
    pub sort: MediaSort,
    pub order: SortOrder,
}
