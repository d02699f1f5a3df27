//! Request guards and cross-cutting middleware.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireModerator`] -- Requires `MODERATOR` or `ADMIN`.
//! - [`rbac::RequireAdmin`] -- Requires `ADMIN`.
//! - [`rate_limit::rate_limit`] -- Fixed-window per-client request budget.

pub mod auth;
pub mod rate_limit;
pub mod rbac;
