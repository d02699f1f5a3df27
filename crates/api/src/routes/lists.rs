//! Route definitions for the `/lists` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::lists;
use crate::state::AppState;

/// Routes mounted at `/lists`.
///
/// ```text
/// GET    /                          -> list_mine
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// POST   /{id}/items                -> add_item
/// PUT    /{id}/items/order          -> reorder
/// DELETE /{id}/items/{media_id}     -> remove_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lists::list_mine).post(lists::create))
        .route(
            "/{id}",
            get(lists::get_by_id)
                .put(lists::update)
                .delete(lists::delete),
        )
        .route("/{id}/items", post(lists::add_item))
        .route("/{id}/items/order", put(lists::reorder))
        .route("/{id}/items/{media_id}", delete(lists::remove_item))
}
