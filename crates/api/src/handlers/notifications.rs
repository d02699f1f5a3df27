//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`] and only ever touch
//! the caller's own notifications.

use axum::extract::State;
use axum::Json;
use mediashelf_core::pagination::PageRequest;
use mediashelf_core::types::DbId;
use mediashelf_db::models::notification::Notification;
use mediashelf_db::repositories::NotificationRepo;
use serde::{Deserialize, Serialize};

use super::not_found;
use crate::error::AppResult;
use crate::extract::{AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notifications`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/notifications
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<NotificationQuery>,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let page = PageRequest::new(params.page, params.limit);
    let unread_only = params.unread_only.unwrap_or(false);

    let (notifications, total) =
        NotificationRepo::list_for_user(&state.pool, auth.user_id, unread_only, page).await?;

    Ok(Json(ApiResponse::paginated(notifications, page, total)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<UnreadCount>>> {
    let count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(ApiResponse::ok(UnreadCount { count })))
}

/// PATCH /api/notifications/{id}/read
///
/// 404 when the notification does not belong to the caller.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(notification_id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let found = NotificationRepo::mark_read(&state.pool, notification_id, auth.user_id).await?;
    if !found {
        return Err(not_found("Notification", notification_id));
    }
    Ok(Json(ApiResponse::message("Notification marked as read")))
}

/// PATCH /api/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<MarkedRead>>> {
    let updated = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    tracing::debug!(user_id = auth.user_id, updated, "Marked all notifications read");
    Ok(Json(ApiResponse::ok(MarkedRead { updated })))
}

/// DELETE /api/notifications/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(notification_id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let deleted = NotificationRepo::delete(&state.pool, notification_id, auth.user_id).await?;
    if !deleted {
        return Err(not_found("Notification", notification_id));
    }
    Ok(Json(ApiResponse::message("Notification deleted")))
}
