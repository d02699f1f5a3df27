//! Handlers for the `/auth` resource (register, login, refresh, logout,
//! current account, password change).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use mediashelf_core::error::{codes, CoreError};
use mediashelf_core::roles::ROLE_USER;
use mediashelf_core::users::{normalize_email, validate_username};
use mediashelf_db::models::refresh_token::CreateRefreshToken;
use mediashelf_db::models::user::{CreateUser, User, UserProfile, UserResponse};
use mediashelf_db::repositories::{RefreshTokenRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{map_unique, AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Constraint names backing the duplicate-account checks.
const UNIQUE_EMAIL: &str = "uq_users_email";
const UNIQUE_USERNAME: &str = "uq_users_username";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30, message = "must be between 3 and 30 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub display_name: Option<String>,
}

/// Request body for `POST /auth/login`. `email` also accepts a username.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Request body for `POST /auth/refresh-token`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/logout`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
    /// Revoke every refresh token of the authenticated caller.
    #[serde(default)]
    pub all_devices: bool,
}

/// Request body for `PUT /auth/password`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub current_password: String,
    pub new_password: String,
}

/// Tokens plus account, returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Returned by refresh. The refresh token itself is not rotated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// The caller's own account with activity counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub ratings_count: i64,
    pub reviews_count: i64,
    pub lists_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

impl AccountResponse {
    fn new(user: &User, profile: &UserProfile) -> Self {
        Self {
            user: UserResponse::from(user),
            ratings_count: profile.ratings_count,
            reviews_count: profile.reviews_count,
            lists_count: profile.lists_count,
            followers_count: profile.followers_count,
            following_count: profile.following_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create a `USER` account and sign it in.
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
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

    let create = CreateUser {
        username: input.username,
        email,
        password_hash,
        role: ROLE_USER.to_string(),
        display_name: input.display_name,
    };
    let user = create_user(&state, &create).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let response = issue_tokens(&state, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(response).with_message("Registration successful")),
    ))
}

/// POST /api/auth/login
///
/// Authenticate with email (or username) + password.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    input.validate()?;

    let user = UserRepo::find_by_login(&state.pool, input.email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    UserRepo::record_login(&state.pool, user.id).await?;
    let pruned = RefreshTokenRepo::delete_expired_for_user(&state.pool, user.id).await?;
    if pruned > 0 {
        tracing::debug!(user_id = user.id, pruned, "Removed expired refresh tokens");
    }

    let response = issue_tokens(&state, &user).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(
        ApiResponse::ok(response).with_message("Login successful"),
    ))
}

/// POST /api/auth/refresh-token
///
/// Exchange a stored, unexpired refresh token for a new access token.
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(input): AppJson<RefreshRequest>,
) -> AppResult<Json<ApiResponse<AccessTokenResponse>>> {
    let token_hash = hash_refresh_token(input.refresh_token.trim());

    let stored = RefreshTokenRepo::find_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::unauthorized_with(
                codes::INVALID_REFRESH_TOKEN,
                "Invalid refresh token",
            ))
        })?;

    if stored.is_expired_at(Utc::now()) {
        RefreshTokenRepo::delete(&state.pool, stored.id).await?;
        tracing::info!(user_id = stored.user_id, "Rejected expired refresh token");
        return Err(AppError::Core(CoreError::unauthorized_with(
            codes::REFRESH_TOKEN_EXPIRED,
            "Refresh token has expired",
        )));
    }

    let user = UserRepo::find_by_id(&state.pool, stored.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::unauthorized_with(
                codes::INVALID_REFRESH_TOKEN,
                "Invalid refresh token",
            ))
        })?;

    let access_token =
        generate_access_token(user.id, &user.role, &user.email, &state.config.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(ApiResponse::ok(AccessTokenResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_secs(),
    })))
}

/// POST /api/auth/logout
///
/// Revoke the supplied refresh token, or all of the caller's tokens when
/// `allDevices` is set on an authenticated request. Always succeeds.
pub async fn logout(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    AppJson(input): AppJson<LogoutRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut revoked = 0;

    if let Some(token) = input.refresh_token.as_deref() {
        revoked += RefreshTokenRepo::delete_by_hash(&state.pool, &hash_refresh_token(token.trim()))
            .await?;
    }

    if input.all_devices {
        if let Some(user) = &auth {
            revoked += RefreshTokenRepo::delete_all_for_user(&state.pool, user.user_id).await?;
        }
    }

    tracing::info!(
        user_id = auth.as_ref().map(|u| u.user_id),
        revoked,
        "Logout"
    );

    Ok(Json(ApiResponse::message("Logged out successfully")))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<AccountResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    let profile = UserRepo::profile(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    Ok(Json(ApiResponse::ok(AccountResponse::new(&user, &profile))))
}

/// PUT /api/auth/password
///
/// Change the caller's password and revoke every refresh token.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    input.validate()?;
    validate_password_strength(&input.new_password).map_err(CoreError::Validation)?;

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    let current_valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(AppError::Core(CoreError::unauthorized_with(
            codes::INVALID_CREDENTIALS,
            "Current password is incorrect",
        )));
    }

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &new_hash).await?;
    let revoked = RefreshTokenRepo::delete_all_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, revoked, "Password changed");

    Ok(Json(ApiResponse::message(
        "Password changed. Please log in again on other devices.",
    )))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a user, mapping a lost uniqueness race to the same 409 codes as
/// the pre-checks.
pub(crate) async fn create_user(state: &AppState, input: &CreateUser) -> AppResult<User> {
    UserRepo::create(&state.pool, input).await.map_err(|err| {
        if mediashelf_db::is_unique_violation(&err, UNIQUE_EMAIL) {
            email_taken()
        } else {
            map_unique(UNIQUE_USERNAME, codes::USERNAME_EXISTS, "Username is already taken")(err)
        }
    })
}

pub(crate) fn email_taken() -> AppError {
    AppError::Core(CoreError::conflict(
        codes::EMAIL_EXISTS,
        "Email is already registered",
    ))
}

pub(crate) fn username_taken() -> AppError {
    AppError::Core(CoreError::conflict(
        codes::USERNAME_EXISTS,
        "Username is already taken",
    ))
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::unauthorized_with(
        codes::INVALID_CREDENTIALS,
        "Invalid email or password",
    ))
}

/// Generate access + refresh tokens and persist the refresh token hash.
async fn issue_tokens(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, &user.role, &user.email, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let expires_at = jwt
        .refresh_token_expires_at(Utc::now())
        .ok_or_else(|| AppError::InternalError("Refresh token expiry out of range".into()))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let token_input = CreateRefreshToken {
        user_id: user.id,
        token_hash: refresh_hash,
        expires_at,
    };
    RefreshTokenRepo::create(&state.pool, &token_input).await?;

    Ok(AuthResponse {
        user: UserResponse::from(user),
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: jwt.access_token_expiry_secs(),
    })
}
