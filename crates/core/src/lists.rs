//! User-curated list rules.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

pub const MAX_LIST_NAME_LENGTH: usize = 100;

/// Validate a list name: non-blank and at most [`MAX_LIST_NAME_LENGTH`] characters.
pub fn validate_list_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("list name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_LIST_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "list name must be at most {MAX_LIST_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Check that `requested` is a permutation of `current` (same media ids,
/// each exactly once).
pub fn validate_reorder(current: &[DbId], requested: &[DbId]) -> Result<(), CoreError> {
    if current.len() != requested.len() {
        return Err(CoreError::Validation(format!(
            "mediaIds must contain exactly the {} items of the list",
            current.len()
        )));
    }

    let mut seen = HashSet::with_capacity(requested.len());
    if let Some(dup) = requested.iter().find(|id| !seen.insert(**id)) {
        return Err(CoreError::Validation(format!(
            "media id {dup} appears more than once"
        )));
    }

    let existing: HashSet<DbId> = current.iter().copied().collect();
    if let Some(unknown) = requested.iter().find(|id| !existing.contains(id)) {
        return Err(CoreError::Validation(format!(
            "media id {unknown} is not in this list"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_is_accepted() {
        assert!(validate_reorder(&[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(validate_reorder(&[], &[]).is_ok());
    }

    #[test]
    fn missing_items_are_rejected() {
        assert!(validate_reorder(&[1, 2, 3], &[1, 2]).is_err());
    }

    #[test]
    fn duplicates_are_rejected() {
        assert!(validate_reorder(&[1, 2, 3], &[1, 1, 2]).is_err());
    }

    #[test]
    fn foreign_ids_are_rejected() {
        assert!(validate_reorder(&[1, 2, 3], &[1, 2, 4]).is_err());
    }

    #[test]
    fn list_name_bounds() {
        assert!(validate_list_name("Favourites").is_ok());
        assert!(validate_list_name("  ").is_err());
        assert!(validate_list_name(&"n".repeat(MAX_LIST_NAME_LENGTH + 1)).is_err());
    }
}
