//! End-to-end tests for the catalog.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p catalog-integration-tests
//! ```
//!
//! Each test starts its own server on an ephemeral port, backed by the
//! in-memory store, and drives it over real HTTP through `catalog-client`.
//! No database or external service is needed.
//!
//! # Test Categories
//!
//! - `auth` - signup, login, profile and the bearer-token gateway
//! - `products` - owner-scoped CRUD, partial updates and image rules
//! - `client` - response caching, dashboard chips and form submission

use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use catalog_api::AppState;
use catalog_api::db::MemoryStore;
use catalog_api::services::TokenService;
use catalog_client::{CatalogClient, Session, SignupForm};

/// Signing key used by every test server.
pub const TEST_SECRET: &str = "k9$Qz!r2@Lm#4vX8&pW1*eT6^bN3%cY7";

/// A running API server. Aborted on drop.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind to `127.0.0.1:0` and serve the API in a background task.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let tokens = TokenService::new(&SecretString::from(TEST_SECRET));
        let state = AppState::new(Arc::new(MemoryStore::new()), tokens);
        let app = catalog_api::app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, handle }
    }

    /// `http://127.0.0.1:<port>`
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full URL for a path such as `/api/products`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    /// A client with no session.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected.
    #[must_use]
    pub fn client(&self) -> CatalogClient {
        CatalogClient::new(&self.base_url()).expect("Failed to create client")
    }

    /// A new client signed up as `email` with password `pw`.
    ///
    /// # Panics
    ///
    /// Panics if signup fails.
    pub async fn signed_up(&self, email: &str) -> (CatalogClient, Session) {
        let client = self.client();
        let session = client
            .signup(&SignupForm::new(email, "pw"))
            .await
            .expect("Signup failed");
        (client, session)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
