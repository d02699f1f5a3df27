//! Media rating model and DTOs.

use mediashelf_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `media_ratings` joined with the author's username and the
/// media title.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub media_id: DbId,
    pub media_title: String,
    pub score: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Optional filters for rating listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingFilter {
    pub media_id: Option<DbId>,
    pub user_id: Option<DbId>,
}
