//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require authentication.

use axum::routing::{delete, get, patch};
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                 -> list
/// GET    /unread-count     -> unread_count
/// PATCH  /read-all         -> mark_all_read
/// DELETE /{id}             -> delete
/// PATCH  /{id}/read        -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list))
        .route("/unread-count", get(notifications::unread_count))
        .route("/read-all", patch(notifications::mark_all_read))
        .route("/{id}", delete(notifications::delete))
        .route("/{id}/read", patch(notifications::mark_read))
}
