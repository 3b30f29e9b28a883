//! Product domain types.

use catalog_core::dto::Product;
use catalog_core::{Category, ImageSourceError, ImageUpdate, Price, ProductImage};

/// Every mutable product field, validated.
///
/// Used for inserts and full replacements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub title: String,
    pub price: Price,
    pub description: String,
    pub category: Category,
    pub image: ProductImage,
}

/// A validated partial update. `None` leaves the stored field untouched.
///
/// Stores apply the whole change in one step against the current row, so
/// concurrent updates of different fields do not overwrite each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub price: Option<Price>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub image: ImageUpdate,
}

impl ProductChanges {
    /// Apply the changes to a stored product. Does not touch `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageSourceError`] if the stored image was inconsistent.
    pub fn apply_to(&self, product: &mut Product) -> Result<(), ImageSourceError> {
        product.image = self.image.apply_to(&product.image)?;
        if let Some(title) = &self.title {
            product.title.clone_from(title);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        Ok(())
    }
}
