//! Subcommand implementations.

pub mod auth;
pub mod migrate;
pub mod products;

use serde::Serialize;
use thiserror::Error;

use catalog_client::{CatalogClient, ClientError, ImageError};
use catalog_core::PriceError;

/// Connection settings shared by every API command.
pub struct Api {
    pub server: String,
    pub token: Option<String>,
}

impl Api {
    /// A client without a session.
    pub fn anonymous(&self) -> Result<CatalogClient, CommandError> {
        Ok(CatalogClient::new(&self.server)?)
    }

    /// A client signed in with `--token` / `CATALOG_TOKEN`.
    pub async fn signed_in(&self) -> Result<CatalogClient, CommandError> {
        let token = self.token.as_deref().ok_or(CommandError::MissingToken)?;
        Ok(CatalogClient::with_token(&self.server, token).await?)
    }
}

/// Errors from API commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No token was supplied for a command that needs one.
    #[error("No token: pass --token or set CATALOG_TOKEN (see `catalog login`)")]
    MissingToken,

    /// The API call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// An image could not be prepared for upload.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// A `--price` value was not a valid price.
    #[error("Invalid price: {0}")]
    Price(#[from] PriceError),

    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let json = serde_json::to_string_pretty(value)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}
