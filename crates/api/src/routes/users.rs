//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create (admin)
/// GET    /{id}             -> get_by_id
/// PATCH  /{id}             -> update
/// DELETE /{id}             -> delete
/// POST   /{id}/follow      -> follow
/// DELETE /{id}/follow      -> unfollow
/// GET    /{id}/followers   -> followers
/// GET    /{id}/following   -> following
/// GET    /{id}/ratings     -> ratings
/// GET    /{id}/reviews     -> reviews
/// GET    /{id}/lists       -> lists
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route(
            "/{id}",
            get(users::get_by_id)
                .patch(users::update)
                .delete(users::delete),
        )
        .route("/{id}/follow", post(users::follow).delete(users::unfollow))
        .route("/{id}/followers", get(users::followers))
        .route("/{id}/following", get(users::following))
        .route("/{id}/ratings", get(users::ratings))
        .route("/{id}/reviews", get(users::reviews))
        .route("/{id}/lists", get(users::lists))
}
