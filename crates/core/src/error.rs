use crate::types::DbId;

/// Machine-readable error codes surfaced in the `error.code` field of API
/// error responses.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const INVALID_REFRESH_TOKEN: &str = "INVALID_REFRESH_TOKEN";
    pub const REFRESH_TOKEN_EXPIRED: &str = "REFRESH_TOKEN_EXPIRED";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const EMAIL_EXISTS: &str = "EMAIL_EXISTS";
    pub const USERNAME_EXISTS: &str = "USERNAME_EXISTS";
    pub const RATING_EXISTS: &str = "RATING_EXISTS";
    pub const REVIEW_EXISTS: &str = "REVIEW_EXISTS";
    pub const LIST_EXISTS: &str = "LIST_EXISTS";
    pub const LIST_ITEM_EXISTS: &str = "LIST_ITEM_EXISTS";
    pub const ALREADY_FOLLOWING: &str = "ALREADY_FOLLOWING";
    pub const GENRE_EXISTS: &str = "GENRE_EXISTS";
    pub const PLATFORM_EXISTS: &str = "PLATFORM_EXISTS";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict ({code}): {message}")]
    Conflict { code: &'static str, message: String },

    #[error("Unauthorized ({code}): {message}")]
    Unauthorized { code: &'static str, message: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// A conflict carrying a specific error code (e.g. [`codes::RATING_EXISTS`]).
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        CoreError::Conflict {
            code,
            message: message.into(),
        }
    }

    /// A generic 401 with the [`codes::UNAUTHORIZED`] code.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        CoreError::Unauthorized {
            code: codes::UNAUTHORIZED,
            message: message.into(),
        }
    }

    /// A 401 with a specific error code.
    pub fn unauthorized_with(code: &'static str, message: impl Into<String>) -> Self {
        CoreError::Unauthorized {
            code,
            message: message.into(),
        }
    }

    /// The 403 returned when an actor is neither the owner nor elevated.
    pub fn permission_denied() -> Self {
        CoreError::Forbidden("You do not have permission to perform this action".into())
    }
}
