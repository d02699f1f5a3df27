//! User-curated media list models and DTOs.

use mediashelf_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `media_lists` with its item count.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaList {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub item_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A list entry joined with the basic media fields needed to render it.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaListItem {
    pub id: DbId,
    pub list_id: DbId,
    pub media_id: DbId,
    pub position: i32,
    pub note: Option<String>,
    pub added_at: Timestamp,
    pub media_type: String,
    pub media_title: String,
    pub cover_image_url: Option<String>,
}

/// DTO for creating a list.
#[derive(Debug, Clone)]
pub struct CreateMediaList {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}

/// DTO for updating a list. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateMediaList {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}
