//! Route definitions for the `/reviews` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::list).post(reviews::create))
        .route(
            "/{id}",
            get(reviews::get_by_id)
                .put(reviews::update)
                .delete(reviews::delete),
        )
}
