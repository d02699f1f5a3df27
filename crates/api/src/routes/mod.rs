pub mod auth;
pub mod genres;
pub mod health;
pub mod lists;
pub mod media;
pub mod notifications;
pub mod ratings;
pub mod reviews;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh-token                              refresh (public)
/// /auth/logout                                     logout (optional auth)
/// /auth/me                                         current account
/// /auth/password                                   change password
///
/// /media                                           list, create (elevated)
/// /media/{id}                                      get, update, delete
/// /media/{id}/ratings                              ratings for a title
/// /media/{id}/reviews                              reviews for a title
///
/// /genres                                          list, create (elevated)
/// /platforms                                       list, create (elevated)
///
/// /ratings                                         list, create
/// /ratings/{id}                                    get, update, delete
/// /reviews                                         list, create
/// /reviews/{id}                                    get, update, delete
///
/// /users                                           list, create (admin)
/// /users/{id}                                      profile, update, delete
/// /users/{id}/follow                               follow, unfollow
/// /users/{id}/followers                            followers
/// /users/{id}/following                            following
/// /users/{id}/ratings|reviews|lists                per-user activity
///
/// /lists                                           own lists, create
/// /lists/{id}                                      get, update, delete
/// /lists/{id}/items                                add item
/// /lists/{id}/items/order                          reorder
/// /lists/{id}/items/{media_id}                     remove item
///
/// /notifications                                   list
/// /notifications/unread-count                      unread count
/// /notifications/read-all                          mark all read
/// /notifications/{id}                              delete
/// /notifications/{id}/read                         mark read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/media", media::router())
        .nest("/genres", genres::genre_router())
        .nest("/platforms", genres::platform_router())
        .nest("/ratings", ratings::router())
        .nest("/reviews", reviews::router())
        .nest("/users", users::router())
        .nest("/lists", lists::router())
        .nest("/notifications", notifications::router())
}
