//! Account email addresses.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons an address is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {} characters", Email::MAX_LENGTH)]
    TooLong,
    /// Not of the form `local@domain`, or contains whitespace.
    #[error("email must look like name@domain")]
    Malformed,
}

/// The account key: a trimmed, lower-cased email address.
///
/// Because parsing folds case, `Ada@Example.com` and `ada@example.com` are
/// the same account. Deserializing runs the same checks, so an `Email` read
/// from JSON is always normalized.
///
/// ```
/// use catalog_core::Email;
///
/// let email = Email::parse("  Ada@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "ada@example.com");
///
/// assert!(Email::parse("ada").is_err());
/// assert!(Email::parse("ada@").is_err());
/// assert!(Email::parse("a b@example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Trim, validate and lower-case an address.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the trimmed input is empty, longer than
    /// [`Self::MAX_LENGTH`], or not a single `local@domain` pair without
    /// whitespace.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_lowercase()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for ok in [
            "user@example.com",
            "user.name+tag@example.co.uk",
            "a@b.c",
            "user@localhost",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_rejections() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse(" \t "), Err(EmailError::Empty));
        assert_eq!(
            Email::parse(&format!("{}@example.com", "a".repeat(250))),
            Err(EmailError::TooLong)
        );
        for bad in ["no-at", "@example.com", "user@", "a@b@c", "a b@example.com"] {
            assert_eq!(Email::parse(bad), Err(EmailError::Malformed), "{bad}");
        }
    }

    #[test]
    fn test_case_and_whitespace_fold_to_one_account() {
        let email = Email::parse("  User.Name@Example.COM\n").unwrap();
        assert_eq!(email.as_str(), "user.name@example.com");
        assert_eq!(email, "user.name@example.com".parse().unwrap());
    }

    #[test]
    fn test_deserialize_validates_and_normalizes() {
        let email: Email = serde_json::from_str("\"Ada@Example.com\"").unwrap();
        assert_eq!(email.to_string(), "ada@example.com");
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"ada@example.com\"");

        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }
}
