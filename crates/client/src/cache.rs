//! Cache types for API responses.

use catalog_core::ProductId;
use catalog_core::dto::{Product, UserProfile};

/// Cache key for read endpoints.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Category(String),
    Product(ProductId),
    Profile,
}

impl CacheKey {
    /// Whether the entry holds product data.
    pub const fn is_product(&self) -> bool {
        !matches!(self, Self::Profile)
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Profile(UserProfile),
}
