//! Catalog API library.
//!
//! The REST server for the multi-tenant product catalog, exposed as a
//! library so the binary, the CLI and the end-to-end tests share one router.
//!
//! ```rust,ignore
//! let state = AppState::new(Arc::new(MemoryStore::new()), TokenService::new(&secret));
//! let app = catalog_api::app(state);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;

pub use routes::HttpSettings;
pub use state::AppState;

/// Build the application router with default transport settings.
pub fn app(state: AppState) -> Router {
    routes::router(state, &HttpSettings::default())
}
