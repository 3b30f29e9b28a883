//! Authentication service.
//!
//! Password signup and login, and the profile lookup behind
//! `GET /api/users/profile`.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{info, instrument, warn};

use catalog_core::dto::{AuthResponse, LoginRequest, SignupRequest, UserProfile};
use catalog_core::{Email, UserId};

use crate::db::{CatalogStore, RepositoryError};
use crate::models::{NewUser, User};
use crate::services::token::TokenService;

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn CatalogStore,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn CatalogStore, tokens: &'a TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new user and sign them in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if email or password is empty.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the normalized email is already registered.
    #[instrument(skip_all, fields(email = %request.email.trim()))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, AuthError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let email = Email::parse(&request.email)?;
        let password_hash = hash_password(&request.password)?;
        let new_user = NewUser::new(email, request.name.as_deref(), password_hash);

        let user = self
            .store
            .create_user(new_user)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user.id, "user signed up");
        self.issue(&user)
    }

    /// Authenticate with email and password.
    ///
    /// Unknown emails, malformed emails and wrong passwords all fail with the
    /// same `AuthError::InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if email or password is empty.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip_all, fields(email = %request.email.trim()))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Ok(email) = Email::parse(&request.email) else {
            warn!("login failed: malformed email");
            return Err(AuthError::InvalidCredentials);
        };

        let Some((user, password_hash)) = self.store.get_password_hash(&email).await? else {
            warn!("login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(&request.password, &password_hash).is_err() {
            warn!(user_id = %user.id, "login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        self.issue(&user)
    }

    /// Public view of the given user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the ID no longer resolves.
    pub async fn profile(&self, user_id: UserId) -> Result<UserProfile, AuthError> {
        self.store
            .get_user(user_id)
            .await?
            .map(|user| user.profile())
            .ok_or(AuthError::UserNotFound)
    }

    fn issue(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let token = self.tokens.sign(user.id, user.email.as_str())?;
        Ok(AuthResponse {
            token,
            user: user.profile(),
        })
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::db::MemoryStore;

    fn tokens() -> TokenService {
        TokenService::new(&SecretString::from("k9$Qz!r2@Lm#4vX8&pW1*eT6^bN3%cY7"))
    }

    fn signup_request(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_owned(),
            password: password.to_owned(),
            name: None,
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(verify_password("hunter23", &hash).is_err());
    }

    #[tokio::test]
    async fn test_signup_token_matches_user() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);

        let response = auth
            .signup(&signup_request(" Ada@Example.com ", "pw"))
            .await
            .unwrap();
        let claims = tokens.verify(&response.token).unwrap();

        assert_eq!(claims.user_id, response.user.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(response.user.username, "ada@example.com");
        assert_eq!(response.user.name, "User");
    }

    #[tokio::test]
    async fn test_signup_requires_fields() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);

        let err = auth.signup(&signup_request("a@b.c", "")).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        let err = auth.signup(&signup_request("  ", "pw")).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        let err = auth.signup(&signup_request("nope", "pw")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_case_insensitive() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);

        auth.signup(&signup_request("ada@example.com", "pw")).await.unwrap();
        let err = auth
            .signup(&signup_request("ADA@example.com", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);
        auth.signup(&signup_request("ada@example.com", "pw")).await.unwrap();

        let wrong_password = auth
            .login(&login_request("ada@example.com", "nope"))
            .await
            .unwrap_err();
        let unknown_email = auth
            .login(&login_request("bob@example.com", "pw"))
            .await
            .unwrap_err();
        let malformed = auth.login(&login_request("bob", "pw")).await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert!(matches!(malformed, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_and_profile() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);
        let signed_up = auth
            .signup(&SignupRequest {
                name: Some("Ada".to_owned()),
                ..signup_request("ada@example.com", "pw")
            })
            .await
            .unwrap();

        let logged_in = auth
            .login(&login_request("ADA@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(logged_in.user, signed_up.user);

        let profile = auth.profile(signed_up.user.id).await.unwrap();
        assert_eq!(profile.name, "Ada");

        let missing = auth.profile(UserId::generate()).await.unwrap_err();
        assert!(matches!(missing, AuthError::UserNotFound));
    }
}
