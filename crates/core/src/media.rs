//! Media catalog rules.
//!
//! A media row is polymorphic over [`MediaType`]. Type-specific columns are
//! nullable in the database; these helpers reject values that belong to a
//! different type so a movie never carries a publisher, a game never
//! carries a runtime, and so on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const MEDIA_TYPE_MOVIE: &str = "MOVIE";
pub const MEDIA_TYPE_GAME: &str = "GAME";
pub const MEDIA_TYPE_MANGA: &str = "MANGA";

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Movie,
    Game,
    Manga,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => MEDIA_TYPE_MOVIE,
            MediaType::Game => MEDIA_TYPE_GAME,
            MediaType::Manga => MEDIA_TYPE_MANGA,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            MEDIA_TYPE_MOVIE => Ok(MediaType::Movie),
            MEDIA_TYPE_GAME => Ok(MediaType::Game),
            MEDIA_TYPE_MANGA => Ok(MediaType::Manga),
            _ => Err(CoreError::Validation(format!(
                "Unknown media type '{s}'. Expected one of: MOVIE, GAME, MANGA"
            ))),
        }
    }
}

/// Type-specific optional fields shared by create and update payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttributes {
    // Movie
    pub director: Option<String>,
    pub runtime_minutes: Option<i32>,
    // Game
    pub developer: Option<String>,
    pub publisher: Option<String>,
    // Manga
    pub author: Option<String>,
    pub volumes: Option<i32>,
    pub chapters: Option<i32>,
}

impl MediaAttributes {
    /// Names of the fields that are set, paired with the media type they belong to.
    fn populated(&self) -> Vec<(&'static str, MediaType)> {
        let mut fields = Vec::new();
        if self.director.is_some() {
            fields.push(("director", MediaType::Movie));
        }
        if self.runtime_minutes.is_some() {
            fields.push(("runtimeMinutes", MediaType::Movie));
        }
        if self.developer.is_some() {
            fields.push(("developer", MediaType::Game));
        }
        if self.publisher.is_some() {
            fields.push(("publisher", MediaType::Game));
        }
        if self.author.is_some() {
            fields.push(("author", MediaType::Manga));
        }
        if self.volumes.is_some() {
            fields.push(("volumes", MediaType::Manga));
        }
        if self.chapters.is_some() {
            fields.push(("chapters", MediaType::Manga));
        }
        fields
    }
}

/// Validate that `attrs` only carries fields that belong to `media_type`,
/// and that numeric fields are in range.
pub fn validate_attributes(media_type: MediaType, attrs: &MediaAttributes) -> Result<(), CoreError> {
    if let Some((field, owner)) = attrs
        .populated()
        .into_iter()
        .find(|(_, owner)| *owner != media_type)
    {
        return Err(CoreError::Validation(format!(
            "Field '{field}' only applies to {owner} media, not {media_type}"
        )));
    }

    if let Some(runtime) = attrs.runtime_minutes {
        if runtime <= 0 {
            return Err(CoreError::Validation(
                "runtimeMinutes must be greater than 0".into(),
            ));
        }
    }
    for (name, value) in [("volumes", attrs.volumes), ("chapters", attrs.chapters)] {
        if matches!(value, Some(v) if v < 0) {
            return Err(CoreError::Validation(format!("{name} must not be negative")));
        }
    }
    Ok(())
}

/// Validate a media title: non-blank and at most [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("title must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Listing sort options
// ---------------------------------------------------------------------------

/// Sort key accepted by `GET /media?sort=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaSort {
    Title,
    ReleaseDate,
    Rating,
    #[default]
    CreatedAt,
}

impl MediaSort {
    /// SQL expression used in `ORDER BY`. Only ever one of these literals is
    /// interpolated into a query.
    pub fn sql_expr(self) -> &'static str {
        match self {
            MediaSort::Title => "m.title",
            MediaSort::ReleaseDate => "m.release_date",
            MediaSort::Rating => "average_rating",
            MediaSort::CreatedAt => "m.created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn sql_keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn media_type_parses_case_insensitively() {
        assert_eq!("movie".parse::<MediaType>().unwrap(), MediaType::Movie);
        assert_eq!("GAME".parse::<MediaType>().unwrap(), MediaType::Game);
        assert_matches!("book".parse::<MediaType>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn movie_fields_are_accepted_on_movies() {
        let attrs = MediaAttributes {
            director: Some("Denis Villeneuve".into()),
            runtime_minutes: Some(155),
            ..Default::default()
        };
        assert!(validate_attributes(MediaType::Movie, &attrs).is_ok());
    }

    #[test]
    fn foreign_fields_are_rejected() {
        let attrs = MediaAttributes {
            publisher: Some("Nintendo".into()),
            ..Default::default()
        };
        let err = validate_attributes(MediaType::Manga, &attrs).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("publisher"));
    }

    #[test]
    fn non_positive_runtime_is_rejected() {
        let attrs = MediaAttributes {
            runtime_minutes: Some(0),
            ..Default::default()
        };
        assert!(validate_attributes(MediaType::Movie, &attrs).is_err());
    }

    #[test]
    fn negative_chapters_are_rejected() {
        let attrs = MediaAttributes {
            chapters: Some(-1),
            ..Default::default()
        };
        assert!(validate_attributes(MediaType::Manga, &attrs).is_err());
    }

    #[test]
    fn blank_and_overlong_titles_are_rejected() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
        assert!(validate_title("Berserk").is_ok());
    }

    #[test]
    fn sort_deserializes_from_camel_case() {
        let sort: MediaSort = serde_json::from_str("\"releaseDate\"").unwrap();
        assert_eq!(sort, MediaSort::ReleaseDate);
        assert_eq!(MediaSort::default().sql_expr(), "m.created_at");
        assert_eq!(SortOrder::default().sql_keyword(), "DESC");
    }
}
