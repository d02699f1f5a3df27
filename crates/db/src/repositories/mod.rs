//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod follow_repo;
pub mod genre_repo;
pub mod list_repo;
pub mod media_repo;
pub mod notification_repo;
pub mod rating_repo;
pub mod refresh_token_repo;
pub mod review_repo;
pub mod user_repo;

pub use follow_repo::FollowRepo;
pub use genre_repo::{GenreRepo, PlatformRepo};
pub use list_repo::ListRepo;
pub use media_repo::MediaRepo;
pub use notification_repo::NotificationRepo;
pub use rating_repo::RatingRepo;
pub use refresh_token_repo::RefreshTokenRepo;
pub use review_repo::ReviewRepo;
pub use user_repo::UserRepo;

/// Build a case-insensitive substring pattern for `ILIKE`, escaping the
/// wildcard characters in user input.
pub(crate) fn like_pattern(input: &str) -> String {
    let escaped = input
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn wraps_in_wildcards() {
        assert_eq!(like_pattern(" dune "), "%dune%");
    }

    #[test]
    fn escapes_wildcards() {
        assert_eq!(like_pattern("100%_a"), "%100\\%\\_a%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
