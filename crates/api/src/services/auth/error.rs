//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::token::TokenError;

/// Errors that can occur during signup, login and profile lookup.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password missing from the request.
    #[error("email and password are required")]
    MissingCredentials,

    /// Invalid email format at signup.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] catalog_core::EmailError),

    /// Invalid credentials (unknown email, malformed email, or wrong password).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The authenticated user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Token signing failed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
