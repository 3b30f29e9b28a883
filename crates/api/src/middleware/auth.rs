//! Bearer token authentication.
//!
//! [`require_auth`] guards every product and profile route. It verifies the
//! `Authorization: Bearer <token>` header and inserts the caller's
//! [`AuthUser`] into the request extensions, where handlers pick it up with
//! the [`AuthUser`] extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{Span, debug};

use catalog_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Rejection message when no `Authorization` header is present.
pub const NO_TOKEN: &str = "Unauthorized: No token provided";
/// Rejection message when the header is not `Bearer <token>`.
pub const INVALID_FORMAT: &str = "Unauthorized: Invalid token format";
/// Rejection message when the token fails verification.
pub const INVALID_TOKEN: &str = "Unauthorized: Invalid or expired token";

/// The verified identity of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// Middleware that rejects requests without a valid bearer token.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` with one of [`NO_TOKEN`],
/// [`INVALID_FORMAT`] or [`INVALID_TOKEN`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers().get(AUTHORIZATION).map(|h| h.to_str()))?;

    let claims = state.tokens().verify(token).map_err(|e| {
        debug!(error = %e, "token verification failed");
        AppError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    Span::current().record("user_id", tracing::field::display(claims.user_id));
    set_sentry_user(&claims.user_id, Some(&claims.email));

    request.extensions_mut().insert(AuthUser {
        id: claims.user_id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// Extract the token from a raw `Authorization` header value.
fn bearer_token<E>(header: Option<Result<&str, E>>) -> Result<&str, AppError> {
    let header = header.ok_or_else(|| AppError::Unauthorized(NO_TOKEN.to_string()))?;
    let invalid_format = || AppError::Unauthorized(INVALID_FORMAT.to_string());

    let value = header.map_err(|_| invalid_format())?;
    if value.is_empty() {
        return Err(AppError::Unauthorized(NO_TOKEN.to_string()));
    }

    // Exactly one space after the scheme; the token itself has no whitespace
    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(char::is_whitespace) => {
            Ok(token)
        }
        _ => Err(invalid_format()),
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized(NO_TOKEN.to_string()))
    }
}
