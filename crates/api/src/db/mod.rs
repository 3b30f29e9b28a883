//! Persistence for users and products.
//!
//! ## Tables
//!
//! - `users` - Accounts (unique normalized email, Argon2 password hash)
//! - `products` - Listings, each owned by exactly one user
//!
//! Handlers never see a concrete store: they go through [`CatalogStore`],
//! which has a `PostgreSQL` implementation ([`PgStore`]) and an in-memory one
//! ([`MemoryStore`]) used by tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p catalog-cli -- migrate
//! ```

pub mod memory;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use catalog_core::dto::Product;
use catalog_core::{Email, ProductId, UserId};

use crate::models::{NewUser, ProductChanges, ProductFields, User};

pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> Result<User, RepositoryError>;

    /// Look up a user by ID.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up a user and their password hash by email.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;
}

/// Owner-scoped product storage.
///
/// Every method takes the requesting owner. A product owned by someone else
/// is indistinguishable from one that does not exist.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// List an owner's products, newest first, optionally restricted to an
    /// exact category.
    async fn list_products(
        &self,
        owner: UserId,
        category: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Fetch one product.
    async fn get_product(
        &self,
        owner: UserId,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Insert a product, stamping both timestamps.
    async fn insert_product(
        &self,
        owner: UserId,
        fields: &ProductFields,
    ) -> Result<Product, RepositoryError>;

    /// Overwrite every mutable field and refresh `updated_at`.
    ///
    /// Returns `None` if no product with this ID belongs to `owner`.
    async fn replace_product(
        &self,
        owner: UserId,
        id: ProductId,
        fields: &ProductFields,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Apply a partial update in a single step and refresh `updated_at`.
    ///
    /// Fields absent from `changes` keep whatever value is stored at the
    /// moment the update runs. Returns `None` if no product with this ID
    /// belongs to `owner`.
    async fn patch_product(
        &self,
        owner: UserId,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Delete a product. Returns whether anything owned was removed.
    async fn delete_product(&self, owner: UserId, id: ProductId) -> Result<bool, RepositoryError>;
}

/// Everything the API needs from storage.
#[async_trait]
pub trait CatalogStore: UserStore + ProductStore {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
