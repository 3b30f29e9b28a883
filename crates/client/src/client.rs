//! REST client for the catalog API.
//!
//! Reads are cached for five minutes. The cache is only ever invalidated by
//! this client, so changes made by another client become visible after the
//! TTL or the next local mutation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument};
use url::Url;

use catalog_core::ProductId;
use catalog_core::dto::{
    AuthResponse, DeleteResponse, ErrorBody, HealthResponse, Product, ProductPayload, UserProfile,
};

use crate::cache::{CacheKey, CacheValue};
use crate::error::ClientError;
use crate::forms::{LoginForm, ProductForm, SignupForm};

/// Token and user of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    /// Known after signup/login; `None` when the session was restored from a
    /// bare token.
    pub user: Option<UserProfile>,
}

/// Client for the catalog REST API.
///
/// Cloning is cheap and clones share the session and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    session: RwLock<Option<Session>>,
    cache: Cache<CacheKey, CacheValue>,
    /// Bumped before every invalidation. A response fetched under an older
    /// generation is not cached.
    generation: AtomicU64,
}

impl CatalogClient {
    /// Create a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .support_invalidation_closures()
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url,
                session: RwLock::new(None),
                cache,
                generation: AtomicU64::new(0),
            }),
        })
    }

    /// Create a client that is already signed in with `token`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub async fn with_token(base_url: &str, token: impl Into<String>) -> Result<Self, ClientError> {
        let client = Self::new(base_url)?;
        *client.inner.session.write().await = Some(Session {
            token: token.into(),
            user: None,
        });
        Ok(client)
    }

    /// The active session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.inner.session.read().await.clone()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if required fields are blank, or the
    /// server's rejection (for example "Email already registered").
    #[instrument(skip_all)]
    pub async fn signup(&self, form: &SignupForm) -> Result<Session, ClientError> {
        let request = form.validate()?;
        let url = self.endpoint(&["api", "auth", "signup"]);
        let response: AuthResponse = Self::execute(self.inner.client.post(url).json(&request))
            .await?;
        Ok(self.start_session(response).await)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if a field is blank, or the server's
    /// rejection ("Invalid credentials").
    #[instrument(skip_all)]
    pub async fn login(&self, form: &LoginForm) -> Result<Session, ClientError> {
        let request = form.validate()?;
        let url = self.endpoint(&["api", "auth", "login"]);
        let response: AuthResponse = Self::execute(self.inner.client.post(url).json(&request))
            .await?;
        Ok(self.start_session(response).await)
    }

    /// Drop the session and every cached response.
    pub async fn logout(&self) {
        *self.inner.session.write().await = None;
        self.invalidate_all().await;
    }

    /// The signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session, or the
    /// server's rejection.
    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        if let Some(CacheValue::Profile(profile)) = self.inner.cache.get(&CacheKey::Profile).await
        {
            debug!("Cache hit for profile");
            return Ok(profile);
        }

        let generation = self.generation();
        let url = self.endpoint(&["api", "users", "profile"]);
        let profile: UserProfile = Self::execute(self.authorized(Method::GET, url).await?).await?;

        self.cache_fetched(generation, CacheKey::Profile, CacheValue::Profile(profile.clone()))
            .await;
        Ok(profile)
    }

    /// Liveness probe. Needs no session.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = self.endpoint(&["api", "health"]);
        Self::execute(self.inner.client.get(url)).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// All of the caller's products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session, or the
    /// server's rejection.
    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        self.product_list(CacheKey::Products, &["api", "products"])
            .await
    }

    /// The caller's products in exactly `category`, newest first.
    ///
    /// # Errors
    ///
    /// Same as [`Self::products`].
    pub async fn products_in_category(&self, category: &str) -> Result<Vec<Product>, ClientError> {
        self.product_list(
            CacheKey::Category(category.to_owned()),
            &["api", "products", "category", category],
        )
        .await
    }

    /// One of the caller's products.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 ("Product not found") if it
    /// does not exist or belongs to someone else.
    pub async fn product(&self, id: ProductId) -> Result<Product, ClientError> {
        let cache_key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!(%id, "Cache hit for product");
            return Ok(*product);
        }

        let generation = self.generation();
        let url = self.endpoint(&["api", "products", &id.to_string()]);
        let product: Product = Self::execute(self.authorized(Method::GET, url).await?).await?;

        self.cache_fetched(
            generation,
            cache_key,
            CacheValue::Product(Box::new(product.clone())),
        )
        .await;
        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns the server's validation message on a 400.
    #[instrument(skip_all)]
    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, ClientError> {
        let url = self.endpoint(&["api", "products"]);
        self.mutate(Method::POST, url, payload).await
    }

    /// Overwrite every field of a product.
    ///
    /// # Errors
    ///
    /// Returns the server's rejection on a 400 or 404.
    #[instrument(skip_all, fields(%id))]
    pub async fn replace_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, ClientError> {
        let url = self.endpoint(&["api", "products", &id.to_string()]);
        self.mutate(Method::PUT, url, payload).await
    }

    /// Overwrite only the fields present in `payload`.
    ///
    /// # Errors
    ///
    /// Returns the server's rejection on a 400 or 404.
    #[instrument(skip_all, fields(%id))]
    pub async fn patch_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, ClientError> {
        let url = self.endpoint(&["api", "products", &id.to_string()]);
        self.mutate(Method::PATCH, url, payload).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns the server's rejection on a 404.
    #[instrument(skip_all, fields(%id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "products", &id.to_string()]);
        let _: DeleteResponse = Self::execute(self.authorized(Method::DELETE, url).await?)
            .await?;
        self.invalidate_products()?;
        Ok(())
    }

    /// Submit a product form: create when new, full replace when editing.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an incomplete form, or the
    /// server's rejection.
    pub async fn save_product(&self, form: &ProductForm) -> Result<Product, ClientError> {
        let payload = form.to_payload()?;
        match form.editing() {
            Some(id) => self.replace_product(id, &payload).await,
            None => self.create_product(&payload).await,
        }
    }

    /// Drop every cached response.
    pub async fn invalidate_all(&self) {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn authorized(&self, method: Method, url: Url) -> Result<RequestBuilder, ClientError> {
        let session = self.inner.session.read().await;
        let token = session
            .as_ref()
            .map(|s| s.token.as_str())
            .ok_or(ClientError::NotAuthenticated)?;
        Ok(self.inner.client.request(method, url).bearer_auth(token))
    }

    async fn start_session(&self, response: AuthResponse) -> Session {
        let session = Session {
            token: response.token,
            user: Some(response.user),
        };
        *self.inner.session.write().await = Some(session.clone());
        self.invalidate_all().await;
        session
    }

    async fn product_list(
        &self,
        cache_key: CacheKey,
        segments: &[&str],
    ) -> Result<Vec<Product>, ClientError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!(key = ?cache_key, "Cache hit for product list");
            return Ok(products);
        }

        let generation = self.generation();
        let url = self.endpoint(segments);
        let products: Vec<Product> = Self::execute(self.authorized(Method::GET, url).await?).await?;

        self.cache_fetched(generation, cache_key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    async fn mutate<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<Product, ClientError> {
        let request = self.authorized(method, url).await?.json(body);
        let product: Product = Self::execute(request).await?;
        self.invalidate_products()?;
        Ok(product)
    }

    fn invalidate_products(&self) -> Result<(), ClientError> {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner
            .cache
            .invalidate_entries_if(|key, _| key.is_product())?;
        Ok(())
    }

    fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Cache a response fetched under `generation`, unless an invalidation
    /// ran while it was in flight.
    async fn cache_fetched(&self, generation: u64, key: CacheKey, value: CacheValue) {
        if self.generation() != generation {
            debug!(key = ?key, "Discarding response fetched before invalidation");
            return;
        }
        self.inner.cache.insert(key.clone(), value).await;
        // An invalidation that started after the check above may have missed
        // this entry
        if self.generation() != generation {
            self.inner.cache.invalidate(&key).await;
        }
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first so failures can quote the server's message
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&response_text).map_or_else(
                |_| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_owned()
                },
                |body| body.message,
            );
            debug!(status = %status, message = %message, "API returned non-success status");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ClientError::Parse(e)
        })
    }
}
