//! Notification kinds and message text.
//!
//! Kind names must match the `ck_notifications_kind` check constraint.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const KIND_NEW_FOLLOWER: &str = "NEW_FOLLOWER";
pub const KIND_NEW_REVIEW: &str = "NEW_REVIEW";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// Someone started following the recipient.
    NewFollower,
    /// A user the recipient follows published a review.
    NewReview,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::NewFollower => KIND_NEW_FOLLOWER,
            NotificationKind::NewReview => KIND_NEW_REVIEW,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title and body for a [`NotificationKind::NewFollower`] notification.
pub fn new_follower_text(follower_username: &str) -> (String, String) {
    (
        "New follower".to_string(),
        format!("{follower_username} started following you"),
    )
}

/// Title and body for a [`NotificationKind::NewReview`] notification.
pub fn new_review_text(author_username: &str, media_title: &str) -> (String, String) {
    (
        "New review".to_string(),
        format!("{author_username} reviewed {media_title}"),
    )
}
