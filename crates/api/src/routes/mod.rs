//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/health                       - Liveness
//! GET    /api/health/ready                 - Readiness (store ping)
//!
//! # Auth
//! POST   /api/auth/signup                  - Create account, returns token
//! POST   /api/auth/login                   - Authenticate, returns token
//!
//! # Requires bearer token
//! GET    /api/users/profile                - Current user
//! GET    /api/products                     - List own products, newest first
//! POST   /api/products                     - Create product
//! GET    /api/products/category/{category} - List own products in a category
//! GET    /api/products/{id}                - Single product
//! PUT    /api/products/{id}                - Replace product
//! PATCH  /api/products/{id}                - Partial update
//! DELETE /api/products/{id}                - Delete product
//! ```

pub mod auth;
pub mod health;
pub mod products;
pub mod users;

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::middleware::{request_id_middleware, require_auth, security_headers_middleware};
use crate::state::AppState;

/// Default JSON body limit: large enough for embedded images.
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Transport settings for the router.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub max_body_bytes: usize,
    /// Allowed CORS origins; empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors_origins: Vec::new(),
        }
    }
}

impl From<&ApiConfig> for HttpSettings {
    fn from(config: &ApiConfig) -> Self {
        Self {
            max_body_bytes: config.max_body_bytes,
            cors_origins: config.cors_origins.clone(),
        }
    }
}

/// Routes that require a bearer token.
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/profile", get(users::profile))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/category/{category}",
            get(products::list_by_category),
        )
        .route(
            "/products/{id}",
            get(products::get)
                .put(products::replace)
                .patch(products::patch)
                .delete(products::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

/// Routes open to anonymous callers.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
}

/// Build the full application router with its middleware stack.
pub fn router(state: AppState, settings: &HttpSettings) -> Router {
    let api = public_routes().merge(protected_routes(&state));

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(settings.max_body_bytes))
        .layer(cors_layer(&settings.cors_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// CORS for browser clients. An empty list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(600));

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::db::MemoryStore;
    use crate::middleware::REQUEST_ID_HEADER;
    use crate::services::TokenService;

    fn test_app() -> Router {
        let tokens = TokenService::new(&SecretString::from("k9$Qz!r2@Lm#4vX8&pW1*eT6^bN3%cY7"));
        router(
            AppState::new(Arc::new(MemoryStore::new()), tokens),
            &HttpSettings::default(),
        )
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn signup(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({"email": email, "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "ok", "message": "Catalog API is running."}));
    }

    #[tokio::test]
    async fn test_readiness_with_memory_store() {
        let (status, body) = send(&test_app(), "GET", "/api/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = test_app()
            .oneshot(
                Request::get("/api/health")
                    .header(REQUEST_ID_HEADER, "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-123");
    }

    #[tokio::test]
    async fn test_auth_gateway_messages() {
        let app = test_app();

        let (status, body) = send(&app, "GET", "/api/products", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized: No token provided");

        let request = Request::get("/api/products")
            .header(header::AUTHORIZATION, "Token abc")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Unauthorized: Invalid token format");

        let (status, body) = send(&app, "GET", "/api/products", Some("abc.def.ghi"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized: Invalid or expired token");
    }

    #[tokio::test]
    async fn test_signup_login_profile() {
        let app = test_app();
        let token = signup(&app, "Ada@Example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({"email": "ada@example.com", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Email already registered");

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "ada@example.com");

        let (status, body) = send(&app, "GET", "/api/users/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "ada@example.com");
        assert_eq!(body["name"], "User");
        assert!(body.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_missing_fields_and_bad_json() {
        let app = test_app();

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email and password are required");

        let request = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_mug_defaults() {
        let app = test_app();
        let token = signup(&app, "ada@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/products",
            Some(&token),
            Some(json!({"title": "Mug", "price": 9.5})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["category"], "general");
        assert_eq!(body["description"], "");
        assert_eq!(body["price"], 9.5);
        assert_eq!(body["imageUrl"], "");
        assert_eq!(body["imageBase64"], "");

        let (status, body) = send(
            &app,
            "POST",
            "/api/products",
            Some(&token),
            Some(json!({"title": "Mug"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Title and price are required");
    }

    #[tokio::test]
    async fn test_invalid_price_is_bad_request() {
        let app = test_app();
        let token = signup(&app, "ada@example.com").await;

        for price in [json!(-1), json!("abc")] {
            let (status, _) = send(
                &app,
                "POST",
                "/api/products",
                Some(&token),
                Some(json!({"title": "Mug", "price": price})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_non_uuid_product_id_is_not_found() {
        let app = test_app();
        let token = signup(&app, "ada@example.com").await;

        let (status, body) = send(&app, "GET", "/api/products/not-an-id", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product not found");
    }

    #[tokio::test]
    async fn test_foreign_product_is_not_found() {
        let app = test_app();
        let owner = signup(&app, "owner@example.com").await;
        let intruder = signup(&app, "intruder@example.com").await;

        let (_, product) = send(
            &app,
            "POST",
            "/api/products",
            Some(&owner),
            Some(json!({"title": "Mug", "price": 1})),
        )
        .await;
        let uri = format!("/api/products/{}", product["id"].as_str().unwrap());

        let (status, _) = send(&app, "GET", &uri, Some(&intruder), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &uri, Some(&intruder), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "DELETE", &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let (status, body) = send(&test_app(), "GET", "/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Not found");
    }
}
