//! User domain types.

use chrono::{DateTime, Utc};

use catalog_core::dto::UserProfile;
use catalog_core::{Email, UserId};

/// Display name given to accounts created without one.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// A catalog account (domain type). Never mutated after signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized (lower-cased) email address.
    pub email: Email,
    /// Mirrors the normalized email.
    pub username: String,
    /// Display name.
    pub name: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The public view of this user.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    pub password_hash: String,
}

impl NewUser {
    /// Build a new user, defaulting a blank display name.
    #[must_use]
    pub fn new(email: Email, name: Option<&str>, password_hash: String) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
            .to_owned();
        Self {
            email,
            name,
            password_hash,
        }
    }

    /// Username mirrors the normalized email.
    #[must_use]
    pub fn username(&self) -> &str {
        self.email.as_str()
    }
}
