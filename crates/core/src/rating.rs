//! Rating score rules.

use crate::error::CoreError;

/// Lowest accepted score.
pub const MIN_SCORE: i16 = 1;

/// Highest accepted score.
pub const MAX_SCORE: i16 = 10;

/// Validate a score is within `MIN_SCORE..=MAX_SCORE`.
pub fn validate_score(score: i16) -> Result<(), CoreError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(CoreError::Validation(format!(
            "score must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
        )));
    }
    Ok(())
}
