//! Owner-scoped product operations.
//!
//! Validation lives here so that both store implementations receive only
//! well-formed [`ProductFields`].

use thiserror::Error;
use tracing::{info, instrument};

use catalog_core::dto::{Product, ProductPayload};
use catalog_core::{Category, ImageSourceError, ImageUpdate, ProductId, ProductImage, UserId};

use crate::db::{CatalogStore, RepositoryError};
use crate::models::{ProductChanges, ProductFields};

/// Errors from product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// Title or price missing on create/replace.
    #[error("title and price are required")]
    MissingFields,

    /// A partial update supplied an empty title.
    #[error("title must not be empty")]
    BlankTitle,

    /// Image URL and embedded image supplied together.
    #[error(transparent)]
    Image(#[from] ImageSourceError),

    /// No product with this ID belongs to the requester.
    #[error("product not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Product CRUD for one requester.
pub struct ProductService<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> ProductService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// List the owner's products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` if the store fails.
    pub async fn list(
        &self,
        owner: UserId,
        category: Option<&str>,
    ) -> Result<Vec<Product>, ProductError> {
        Ok(self.store.list_products(owner, category).await?)
    }

    /// Fetch one of the owner's products.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if it does not exist or is not owned.
    pub async fn get(&self, owner: UserId, id: ProductId) -> Result<Product, ProductError> {
        self.store
            .get_product(owner, id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Create a product from a full payload.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::MissingFields` or `ProductError::Image` for an
    /// invalid payload.
    #[instrument(skip(self, payload), fields(%owner))]
    pub async fn create(
        &self,
        owner: UserId,
        payload: &ProductPayload,
    ) -> Result<Product, ProductError> {
        let fields = full_fields(payload)?;
        let product = self.store.insert_product(owner, &fields).await?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Overwrite every mutable field.
    ///
    /// # Errors
    ///
    /// Same validation as [`Self::create`], plus `ProductError::NotFound`.
    #[instrument(skip(self, payload), fields(%owner, %id))]
    pub async fn replace(
        &self,
        owner: UserId,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, ProductError> {
        let fields = full_fields(payload)?;
        self.store
            .replace_product(owner, id, &fields)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Overwrite only the supplied fields. `updated_at` is always refreshed.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::BlankTitle` or `ProductError::Image` for an
    /// invalid payload and `ProductError::NotFound` if not owned.
    #[instrument(skip(self, payload), fields(%owner, %id))]
    pub async fn patch(
        &self,
        owner: UserId,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, ProductError> {
        let changes = partial_changes(payload)?;
        self.store
            .patch_product(owner, id, &changes)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Delete one of the owner's products.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if nothing owned was removed.
    #[instrument(skip(self), fields(%owner, %id))]
    pub async fn delete(&self, owner: UserId, id: ProductId) -> Result<(), ProductError> {
        if self.store.delete_product(owner, id).await? {
            info!("product deleted");
            Ok(())
        } else {
            Err(ProductError::NotFound)
        }
    }
}

/// Validate a create/replace payload and apply defaults.
///
/// The title is stored as sent; only a blank one is rejected.
fn full_fields(payload: &ProductPayload) -> Result<ProductFields, ProductError> {
    let title = payload
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or(ProductError::MissingFields)?;
    let price = payload.price.ok_or(ProductError::MissingFields)?;
    let image = ProductImage::None.apply(
        payload.image_url.as_deref(),
        payload.image_base64.as_deref(),
    )?;

    Ok(ProductFields {
        title: title.to_owned(),
        price,
        description: payload.description.clone().unwrap_or_default(),
        category: Category::new(payload.category.as_deref().unwrap_or_default()),
        image,
    })
}

/// Validate a partial payload without looking at the stored product.
fn partial_changes(payload: &ProductPayload) -> Result<ProductChanges, ProductError> {
    if payload.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ProductError::BlankTitle);
    }

    Ok(ProductChanges {
        title: payload.title.clone(),
        price: payload.price,
        description: payload.description.clone(),
        category: payload.category.as_deref().map(Category::new),
        image: ImageUpdate::new(
            payload.image_url.as_deref(),
            payload.image_base64.as_deref(),
        )?,
    })
}
