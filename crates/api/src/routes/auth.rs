//! Signup and login.

use axum::{Json, extract::State, http::StatusCode};

use catalog_core::dto::{AuthResponse, LoginRequest, SignupRequest};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::services::AuthService;
use crate::state::AppState;

/// `POST /api/auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = AuthService::new(state.store(), state.tokens())
        .signup(&request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let response = AuthService::new(state.store(), state.tokens())
        .login(&request)
        .await?;
    Ok(Json(response))
}
