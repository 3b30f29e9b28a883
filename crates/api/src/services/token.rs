//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user's ID and email. They live for
//! seven days and cannot be revoked.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use catalog_core::UserId;

/// Token lifetime.
pub const TOKEN_LIFETIME_DAYS: i64 = 7;

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub email: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Errors from signing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    /// Bad signature, malformed token, or expired.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
        }
    }

    /// Sign a token for a user, issued now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Sign` if encoding fails.
    pub fn sign(&self, user_id: UserId, email: &str) -> Result<String, TokenError> {
        self.sign_at(user_id, email, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`.
    pub(crate) fn sign_at(
        &self,
        user_id: UserId,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at + Duration::days(TOKEN_LIFETIME_DAYS);
        let claims = Claims {
            user_id,
            email: email.to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        debug!(%user_id, "signing token");
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` on a bad signature, a malformed token,
    /// or an elapsed expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}
