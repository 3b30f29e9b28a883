//! Request extractors.

use axum::extract::FromRequest;

use crate::error::AppError;

/// Local version of [`axum::Json`] whose rejection is an [`AppError`], so a
/// malformed body answers `400 {"message": ...}` like every other failure.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
