//! Current-user routes.

use axum::{Json, extract::State};

use catalog_core::dto::UserProfile;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::services::AuthService;
use crate::state::AppState;

/// `GET /api/users/profile`
pub async fn profile(State(state): State<AppState>, user: AuthUser) -> Result<Json<UserProfile>> {
    let profile = AuthService::new(state.store(), state.tokens())
        .profile(user.id)
        .await?;
    Ok(Json(profile))
}
