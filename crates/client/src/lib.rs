//! Catalog Client - typed access to the catalog REST API.
//!
//! # Architecture
//!
//! - [`CatalogClient`] wraps `reqwest` and keeps the signed-in [`Session`]
//! - Read responses are cached in memory via `moka`; every successful product
//!   mutation drops the cached product responses, and login/logout drops
//!   everything
//! - Server failures surface the `message` field of the error body
//!
//! The remaining modules hold client-side state that does not talk to the
//! network: auth and product [`forms`], the [`dashboard`] category chips and
//! the [`image`] downscaler used before embedding an upload.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_client::{CatalogClient, LoginForm};
//!
//! let client = CatalogClient::new("http://127.0.0.1:5000")?;
//! client.login(&LoginForm::new("ada@example.com", "hunter22")).await?;
//!
//! let products = client.products().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod cache;
mod client;
mod error;

pub mod dashboard;
pub mod forms;
pub mod image;

pub use client::{CatalogClient, Session};
pub use crate::image::{DownscaleOptions, ImageError, downscale};
pub use dashboard::CategoryChips;
pub use error::ClientError;
pub use forms::{LoginForm, ProductForm, SignupForm};
