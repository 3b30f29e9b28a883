//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! catalog migrate --database-url postgres://localhost/catalog
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string
//! - `DATABASE_URL` - Used when neither the flag nor `CATALOG_DATABASE_URL` is set
//!
//! Migrations are embedded from `crates/api/migrations/` at build time.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// No connection string was configured.
    #[error("Missing database URL: pass --database-url or set CATALOG_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Pick the connection string: the flag (or `CATALOG_DATABASE_URL`, which
/// clap already folded into it), then `DATABASE_URL`. Blank values are unset.
///
/// # Errors
///
/// Returns `MigrationError::MissingDatabaseUrl` if none is set.
pub fn database_url(
    flag: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, MigrationError> {
    flag.into_iter()
        .chain(lookup("DATABASE_URL"))
        .find(|url| !url.trim().is_empty())
        .map(SecretString::from)
        .ok_or(MigrationError::MissingDatabaseUrl)
}

/// Apply every pending migration.
pub async fn run(database_url: SecretString) -> Result<(), MigrationError> {
    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    pool.close().await;
    tracing::info!("Migrations complete");
    Ok(())
}
