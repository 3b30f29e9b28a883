//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode};

use catalog_core::dto::HealthResponse;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns ok if the server is running. Does not check dependencies.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: Some("Catalog API is running.".to_string()),
    })
}

/// Readiness health check endpoint.
///
/// Verifies store connectivity before returning OK.
/// Returns 503 Service Unavailable if the store is not reachable.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                message: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    message: Some("Store is not reachable".to_string()),
                }),
            )
        }
    }
}
