//! Route definitions for the `/media` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::media;
use crate::state::AppState;

/// Routes mounted at `/media`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// DELETE /{id}           -> delete
/// GET    /{id}/ratings   -> ratings
/// GET    /{id}/reviews   -> reviews
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(media::list).post(media::create))
        .route(
            "/{id}",
            get(media::get_by_id)
                .put(media::update)
                .delete(media::delete),
        )
        .route("/{id}/ratings", get(media::ratings))
        .route("/{id}/reviews", get(media::reviews))
}
