//! Role tiers and ownership checks.
//!
//! Role names must match the `ck_users_role` check constraint in the
//! initial migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

pub const ROLE_USER: &str = "USER";
pub const ROLE_MODERATOR: &str = "MODERATOR";
pub const ROLE_ADMIN: &str = "ADMIN";

/// Authorization tier. Variants are declared in ascending order of privilege
/// so `Ord` can be used for "at least" comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Moderator => ROLE_MODERATOR,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// `MODERATOR` and `ADMIN` may act on records they do not own.
    pub fn is_elevated(self) -> bool {
        self >= Role::Moderator
    }

    /// Whether this role satisfies a minimum requirement.
    pub fn at_least(self, required: Role) -> bool {
        self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(Role::User),
            ROLE_MODERATOR => Ok(Role::Moderator),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Whether `actor_id` with `actor_role` may modify a record owned by `owner_id`.
///
/// Owners may always modify their own records. Records without an owner
/// (e.g. media whose creator was deleted) are only modifiable by elevated roles.
pub fn can_modify(actor_id: DbId, actor_role: Role, owner_id: Option<DbId>) -> bool {
    actor_role.is_elevated() || owner_id == Some(actor_id)
}
