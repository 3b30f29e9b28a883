//! Core types for the catalog.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod image;
pub mod price;

pub use category::Category;
pub use email::{Email, EmailError};
pub use id::*;
pub use image::{ImageSourceError, ImageUpdate, ProductImage};
pub use price::{Price, PriceError};
