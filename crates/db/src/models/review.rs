//! Media review model and DTOs.

use mediashelf_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `media_reviews` joined with the author's username and the
/// media title.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub media_id: DbId,
    pub media_title: String,
    pub title: Option<String>,
    pub content: String,
    pub contains_spoilers: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a review.
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub media_id: DbId,
    pub title: Option<String>,
    pub content: String,
    pub contains_spoilers: bool,
}

/// DTO for updating a review. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateReview {
    /// `None` leaves the title alone; `Some(None)` clears it.
    pub title: Option<Option<String>>,
    pub content: Option<String>,
    pub contains_spoilers: Option<bool>,
}

/// Optional filters for review listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewFilter {
    pub media_id: Option<DbId>,
    pub user_id: Option<DbId>,
}
