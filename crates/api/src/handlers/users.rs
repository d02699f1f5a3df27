//! Handlers for the `/users` resource: profiles, admin account management,
//! the follow graph and per-user activity listings.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mediashelf_core::error::{codes, CoreError};
use mediashelf_core::notifications::{new_follower_text, NotificationKind};
use mediashelf_core::roles::Role;
use mediashelf_core::types::DbId;
use mediashelf_core::users::{normalize_email, validate_username};
use mediashelf_db::models::follow::FollowEntry;
use mediashelf_db::models::list::MediaList;
use mediashelf_db::models::notification::CreateNotification;
use mediashelf_db::models::rating::{Rating, RatingFilter};
use mediashelf_db::models::review::{Review, ReviewFilter};
use mediashelf_db::models::user::{CreateUser, UpdateUser, UserProfile, UserResponse, UserSummary};
use mediashelf_db::repositories::{
    FollowRepo, ListRepo, NotificationRepo, RatingRepo, ReviewRepo, UserRepo,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::auth::{create_user, email_taken, username_taken};
use super::not_found;
use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{PaginationParams, SearchParams};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users` (admin only).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateUserRequest {
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    pub role: Option<Role>,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub display_name: Option<String>,
}

/// Request body for `PATCH /users/{id}`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub display_name: Option<String>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub bio: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub avatar_url: Option<String>,
    pub role: Option<Role>,
}

/// Only the account owner or an admin may act on an account.
fn ensure_self_or_admin(auth: &AuthUser, id: DbId) -> AppResult<()> {
    if auth.user_id != id && !auth.is_admin() {
        return Err(CoreError::permission_denied().into());
    }
    Ok(())
}

async fn ensure_user_exists(state: &AppState, id: DbId) -> AppResult<()> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| not_found("User", id))
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Json<ApiResponse<Vec<UserSummary>>>> {
    let page = params.page_request();
    let (users, total) = UserRepo::list(&state.pool, params.term(), page).await?;
    Ok(Json(ApiResponse::paginated(users, page, total)))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = UserRepo::profile(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// POST /api/users
///
/// Admin-only account creation with an explicit role.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<AdminCreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    input.validate()?;
    validate_username(&input.username)?;

    let email = normalize_email(&input.email);
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(email_taken());
    }
    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(username_taken());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let role = input.role.unwrap_or(Role::User);

    let create = CreateUser {
        username: input.username,
        email,
        password_hash,
        role: role.as_str().to_string(),
        display_name: input.display_name,
    };
    let user = create_user(&state, &create).await?;

    tracing::info!(
        user_id = user.id,
        role = %role,
        admin_id = admin.user_id,
        "User created by admin",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(&user))),
    ))
}

/// PATCH /api/users/{id}
///
/// Profile fields may be changed by the owner or an admin; `role` only by an
/// admin.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    ensure_self_or_admin(&auth, id)?;
    if input.role.is_some() && !auth.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only administrators can change roles".into(),
        )));
    }
    input.validate()?;

    let email = input.email.as_deref().map(normalize_email);
    if let Some(email) = &email {
        if let Some(existing) = UserRepo::find_by_email(&state.pool, email).await? {
            if existing.id != id {
                return Err(email_taken());
            }
        }
    }

    let update = UpdateUser {
        email,
        display_name: input.display_name,
        bio: input.bio,
        avatar_url: input.avatar_url,
        role: input.role.map(|r| r.as_str().to_string()),
    };
    let user = UserRepo::update(&state.pool, id, &update)
        .await
        .map_err(|err| {
            if mediashelf_db::is_unique_violation(&err, "uq_users_email") {
                email_taken()
            } else {
                AppError::Database(err)
            }
        })?
        .ok_or_else(|| not_found("User", id))?;

    tracing::info!(
        user_id = id,
        actor_id = auth.user_id,
        role_changed = update.role.is_some(),
        "User updated",
    );

    Ok(Json(ApiResponse::ok(UserResponse::from(&user))))
}

/// DELETE /api/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    ensure_self_or_admin(&auth, id)?;

    if !UserRepo::delete(&state.pool, id).await? {
        return Err(not_found("User", id));
    }
    // Aggregates on media pages include this user's ratings and reviews.
    state.cache.invalidate_media().await;

    tracing::info!(user_id = id, actor_id = auth.user_id, "User deleted");

    Ok(Json(ApiResponse::message("User deleted")))
}

// ---------------------------------------------------------------------------
// Follow graph
// ---------------------------------------------------------------------------

/// POST /api/users/{id}/follow
pub async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<(StatusCode, Json<ApiResponse<()>>)> {
    if auth.user_id == id {
        return Err(AppError::BadRequest("You cannot follow yourself".into()));
    }
    ensure_user_exists(&state, id).await?;

    if !FollowRepo::follow(&state.pool, auth.user_id, id).await? {
        return Err(AppError::Core(CoreError::conflict(
            codes::ALREADY_FOLLOWING,
            "You are already following this user",
        )));
    }

    tracing::info!(follower_id = auth.user_id, following_id = id, "User followed");

    notify_new_follower(&state, auth.user_id, id).await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("User followed")),
    ))
}

/// DELETE /api/users/{id}/follow
pub async fn unfollow(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !FollowRepo::unfollow(&state.pool, auth.user_id, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Follow",
            id,
        }));
    }

    tracing::info!(follower_id = auth.user_id, following_id = id, "User unfollowed");

    Ok(Json(ApiResponse::message("User unfollowed")))
}

/// GET /api/users/{id}/followers
pub async fn followers(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<FollowEntry>>>> {
    ensure_user_exists(&state, id).await?;
    let page = params.page_request();
    let (entries, total) = FollowRepo::followers(&state.pool, id, page).await?;
    Ok(Json(ApiResponse::paginated(entries, page, total)))
}

/// GET /api/users/{id}/following
pub async fn following(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<FollowEntry>>>> {
    ensure_user_exists(&state, id).await?;
    let page = params.page_request();
    let (entries, total) = FollowRepo::following(&state.pool, id, page).await?;
    Ok(Json(ApiResponse::paginated(entries, page, total)))
}

/// Best-effort `NEW_FOLLOWER` notification; the follow edge is already
/// committed.
async fn notify_new_follower(state: &AppState, follower_id: DbId, followed_id: DbId) {
    let follower = match UserRepo::find_by_id(&state.pool, follower_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(follower_id, error = %e, "Failed to load follower for notification");
            return;
        }
    };

    let (title, message) = new_follower_text(&follower.username);
    let notification = CreateNotification {
        kind: NotificationKind::NewFollower.as_str().to_string(),
        title,
        message,
        actor_id: Some(follower_id),
        media_id: None,
        data: json!({ "followerId": follower_id, "followerUsername": follower.username }),
    };
    if let Err(e) = NotificationRepo::create(&state.pool, followed_id, &notification).await {
        tracing::warn!(follower_id, followed_id, error = %e, "Failed to create follower notification");
    }
}

// ---------------------------------------------------------------------------
// Per-user activity
// ---------------------------------------------------------------------------

/// GET /api/users/{id}/ratings
pub async fn ratings(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<Rating>>>> {
    ensure_user_exists(&state, id).await?;
    let page = params.page_request();
    let filter = RatingFilter {
        media_id: None,
        user_id: Some(id),
    };
    let (ratings, total) = RatingRepo::list(&state.pool, filter, page).await?;
    Ok(Json(ApiResponse::paginated(ratings, page, total)))
}

/// GET /api/users/{id}/reviews
pub async fn reviews(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<Review>>>> {
    ensure_user_exists(&state, id).await?;
    let page = params.page_request();
    let filter = ReviewFilter {
        media_id: None,
        user_id: Some(id),
    };
    let (reviews, total) = ReviewRepo::list(&state.pool, filter, page).await?;
    Ok(Json(ApiResponse::paginated(reviews, page, total)))
}

/// GET /api/users/{id}/lists
///
/// Private lists are included only for the owner or an admin.
pub async fn lists(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Vec<MediaList>>>> {
    ensure_user_exists(&state, id).await?;
    let include_private = auth
        .as_ref()
        .is_some_and(|user| user.user_id == id || user.is_admin());
    let lists = ListRepo::list_for_user(&state.pool, id, include_private).await?;
    Ok(Json(ApiResponse::ok(lists)))
}
