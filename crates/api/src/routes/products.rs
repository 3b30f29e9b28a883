//! Product CRUD routes. Every handler is scoped to the authenticated caller.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use catalog_core::ProductId;
use catalog_core::dto::{DeleteResponse, Product, ProductPayload};

use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::services::ProductService;
use crate::state::AppState;

/// A path ID that is not a UUID cannot name any product.
fn parse_id(raw: &str) -> Result<ProductId> {
    ProductId::parse(raw).map_err(|_| AppError::NotFound("Product not found".to_string()))
}

/// `GET /api/products`
pub async fn list(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<Product>>> {
    let products = ProductService::new(state.store()).list(user.id, None).await?;
    Ok(Json(products))
}

/// `GET /api/products/category/{category}`
pub async fn list_by_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(category): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductService::new(state.store())
        .list(user.id, Some(&category))
        .await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    let product = ProductService::new(state.store()).get(user.id, id).await?;
    Ok(Json(product))
}

/// `POST /api/products`
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = ProductService::new(state.store())
        .create(user.id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}`
pub async fn replace(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    let product = ProductService::new(state.store())
        .replace(user.id, id, &payload)
        .await?;
    Ok(Json(product))
}

/// `PATCH /api/products/{id}`
pub async fn patch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    let product = ProductService::new(state.store())
        .patch(user.id, id, &payload)
        .await?;
    Ok(Json(product))
}

/// `DELETE /api/products/{id}`
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let id = parse_id(&id)?;
    ProductService::new(state.store()).delete(user.id, id).await?;
    Ok(Json(DeleteResponse { success: true }))
}
