//! JWT-based authentication extractor for Axum handlers.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use mediashelf_core::error::{codes, CoreError};
use mediashelf_core::roles::Role;
use mediashelf_core::types::DbId;

use crate::auth::jwt::{validate_token, TokenError};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// Public endpoints that tailor output to the caller take `Option<AuthUser>`;
/// a missing or unusable token then yields `None` instead of a 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub role: Role,
    pub email: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::unauthorized("Missing Authorization header"))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>",
            ))
        })?;

        let claims = validate_token(token.trim(), &state.config.jwt).map_err(|e| match e {
            TokenError::Expired => AppError::Core(CoreError::unauthorized_with(
                codes::TOKEN_EXPIRED,
                "Access token has expired",
            )),
            TokenError::Invalid => AppError::Core(CoreError::unauthorized("Invalid token")),
        })?;

        let role: Role = claims
            .role
            .parse()
            .map_err(|_| AppError::Core(CoreError::unauthorized("Invalid token")))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role,
            email: claims.email,
        })
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key("authorization") {
            return Ok(None);
        }
        match <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable credentials on optional-auth route");
                Ok(None)
            }
        }
    }
}
