//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`, and every failure body is `{"message": "..."}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use catalog_core::dto::ErrorBody;

use crate::db::RepositoryError;
use crate::services::{AuthError, ProductError};

/// Message returned for every server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Product operation failed.
    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// Request body was not valid JSON for the target type.
    #[error("Invalid body: {0}")]
    Json(#[from] JsonRejection),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::MissingCredentials | AuthError::InvalidEmail(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Token(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Product(err) => match err {
                ProductError::MissingFields | ProductError::BlankTitle | ProductError::Image(_) => {
                    StatusCode::BAD_REQUEST
                }
                ProductError::NotFound => StatusCode::NOT_FOUND,
                ProductError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Json(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to show to the client.
    fn client_message(&self) -> String {
        if self.status().is_server_error() {
            // Don't expose internal error details to clients
            return INTERNAL_ERROR_MESSAGE.to_string();
        }

        match self {
            Self::Auth(err) => match err {
                AuthError::MissingCredentials => "Email and password are required".to_string(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserNotFound => "User not found".to_string(),
                AuthError::UserAlreadyExists => "Email already registered".to_string(),
                _ => INTERNAL_ERROR_MESSAGE.to_string(),
            },
            Self::Product(err) => match err {
                ProductError::MissingFields => "Title and price are required".to_string(),
                ProductError::BlankTitle => "Title must not be empty".to_string(),
                ProductError::Image(e) => e.to_string(),
                ProductError::NotFound => "Product not found".to_string(),
                ProductError::Repository(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            },
            Self::Json(rejection) => rejection.body_text(),
            Self::NotFound(msg) | Self::Unauthorized(msg) => msg.clone(),
            Self::Database(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(ErrorBody::new(self.client_message()))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called by the auth middleware after a token verifies.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn get_message(err: AppError) -> String {
        let body = to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice::<ErrorBody>(&body).unwrap().message
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product not found".to_string());
        assert_eq!(err.to_string(), "Not found: Product not found");

        let err = AppError::from(ProductError::MissingFields);
        assert!(err.to_string().starts_with("Product error: "));
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(ProductError::MissingFields.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ProductError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "row 42 is broken".to_string(),
        ));
        assert_eq!(get_message(err).await, INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_client_messages() {
        assert_eq!(
            get_message(AuthError::InvalidCredentials.into()).await,
            "Invalid credentials"
        );
        assert_eq!(
            get_message(AuthError::MissingCredentials.into()).await,
            "Email and password are required"
        );
        assert_eq!(
            get_message(ProductError::NotFound.into()).await,
            "Product not found"
        );
        assert_eq!(
            get_message(AppError::Unauthorized("Unauthorized: No token provided".into())).await,
            "Unauthorized: No token provided"
        );
    }
}
