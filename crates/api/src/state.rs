//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::CatalogStore;
use crate::services::TokenService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store and the token service. The store is constructed once at startup
/// and passed in explicitly.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn CatalogStore>,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, tokens: TokenService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, tokens }),
        }
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn store(&self) -> &dyn CatalogStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
