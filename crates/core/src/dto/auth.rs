//! Account and session bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, UserId};

/// `POST /api/auth/signup` body.
///
/// Missing fields deserialize as empty strings so the server can answer with
/// its own validation message rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `POST /api/auth/login` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub email: Email,
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Returned by signup and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_default_to_empty() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_empty());
        assert!(req.password.is_empty());
    }

    #[test]
    fn test_profile_wire_names() {
        let profile = UserProfile {
            id: UserId::generate(),
            email: Email::parse("ada@example.com").unwrap(),
            username: "ada@example.com".to_owned(),
            name: "Ada".to_owned(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
