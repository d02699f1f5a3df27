//! Shared query parameter types for API handlers.
//!
//! Fields are spelled out per struct rather than `#[serde(flatten)]`ed:
//! flattening through `serde_urlencoded` loses numeric parsing.

use mediashelf_core::pagination::PageRequest;
use mediashelf_core::types::DbId;
use serde::Deserialize;

/// Generic pagination parameters (`?page=&limit=`).
///
/// Normalized into a [`PageRequest`] (page >= 1, limit clamped to 1..=100).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// `?page=&limit=&search=` for user listing.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl SearchParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    /// The search term, or `None` when absent or blank.
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// `?mediaId=&userId=` filters shared by rating and review listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub media_id: Option<DbId>,
    pub user_id: Option<DbId>,
}

impl ActivityParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}
