//! Review content rules.

use crate::error::CoreError;

pub const MIN_CONTENT_LENGTH: usize = 10;
pub const MAX_CONTENT_LENGTH: usize = 10_000;
pub const MAX_REVIEW_TITLE_LENGTH: usize = 200;

/// Validate review content length (in characters, after trimming).
pub fn validate_content(content: &str) -> Result<(), CoreError> {
    let len = content.trim().chars().count();
    if len < MIN_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "content must be at least {MIN_CONTENT_LENGTH} characters"
        )));
    }
    if len > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "content must be at most {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional review title.
pub fn validate_title(title: Option<&str>) -> Result<(), CoreError> {
    match title {
        Some(t) if t.chars().count() > MAX_REVIEW_TITLE_LENGTH => Err(CoreError::Validation(
            format!("title must be at most {MAX_REVIEW_TITLE_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_rejected() {
        assert!(validate_content("too short").is_err());
        assert!(validate_content("          padded     ").is_err());
    }

    #[test]
    fn content_within_bounds_passes() {
        assert!(validate_content("A slow burn that pays off.").is_ok());
        assert!(validate_content(&"a".repeat(MAX_CONTENT_LENGTH)).is_ok());
        assert!(validate_content(&"a".repeat(MAX_CONTENT_LENGTH + 1)).is_err());
    }

    #[test]
    fn title_is_optional_but_bounded() {
        assert!(validate_title(None).is_ok());
        assert!(validate_title(Some("Great")).is_ok());
        assert!(validate_title(Some(&"t".repeat(MAX_REVIEW_TITLE_LENGTH + 1))).is_err());
    }
}
