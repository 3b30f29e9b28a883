//! JSON bodies exchanged over the REST API.
//!
//! Field names are camelCase on the wire. These types are shared by the
//! server and the client so the two cannot drift apart.

pub mod auth;
pub mod product;

use serde::{Deserialize, Serialize};

pub use auth::{AuthResponse, LoginRequest, SignupRequest, UserProfile};
pub use product::{Product, ProductPayload};

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body returned by a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Liveness and readiness probe body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
