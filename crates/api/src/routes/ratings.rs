//! Route definitions for the `/ratings` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::ratings;
use crate::state::AppState;

/// Routes mounted at `/ratings`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(ratings::list).post(ratings::create))
        .route(
            "/{id}",
            get(ratings::get_by_id)
                .put(ratings::update)
                .delete(ratings::delete),
        )
}
