//! `PostgreSQL` product repository.
//!
//! Every statement filters on `user_id` so ownership is enforced by the
//! query itself rather than by a separate check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use catalog_core::dto::Product;
use catalog_core::{Category, Price, ProductId, ProductImage, UserId};

use super::{PgStore, ProductStore, RepositoryError};
use crate::models::{ProductChanges, ProductFields};

const PRODUCT_COLUMNS: &str = "id, user_id, title, price, description, category, \
                               image_url, image_base64, created_at, updated_at";

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    price: Decimal,
    description: String,
    category: String,
    image_url: String,
    image_base64: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let image = ProductImage::from_parts(&row.image_url, &row.image_base64).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid image in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            price,
            description: row.description,
            category: Category::new(&row.category),
            image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn list_products(
        &self,
        owner: UserId,
        category: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE user_id = $1 AND ($2::text IS NULL OR category = $2) \
             ORDER BY created_at DESC, seq DESC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(owner)
            .bind(category)
            .fetch_all(self.pool())
            .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get_product(
        &self,
        owner: UserId,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(self.pool())
            .await?;

        row.map(Product::try_from).transpose()
    }

    async fn insert_product(
        &self,
        owner: UserId,
        fields: &ProductFields,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products \
                 (user_id, title, price, description, category, image_url, image_base64) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(owner)
            .bind(&fields.title)
            .bind(fields.price.amount())
            .bind(&fields.description)
            .bind(fields.category.as_str())
            .bind(fields.image.url())
            .bind(fields.image.embedded())
            .fetch_one(self.pool())
            .await?;

        row.try_into()
    }

    async fn replace_product(
        &self,
        owner: UserId,
        id: ProductId,
        fields: &ProductFields,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "UPDATE products SET \
                 title = $3, price = $4, description = $5, category = $6, \
                 image_url = $7, image_base64 = $8, updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(owner)
            .bind(&fields.title)
            .bind(fields.price.amount())
            .bind(&fields.description)
            .bind(fields.category.as_str())
            .bind(fields.image.url())
            .bind(fields.image.embedded())
            .fetch_optional(self.pool())
            .await?;

        row.map(Product::try_from).transpose()
    }

    async fn patch_product(
        &self,
        owner: UserId,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        // Unset parameters are NULL and COALESCE keeps the stored column
        let sql = format!(
            "UPDATE products SET \
                 title = COALESCE($3, title), \
                 price = COALESCE($4, price), \
                 description = COALESCE($5, description), \
                 category = COALESCE($6, category), \
                 image_url = COALESCE($7, image_url), \
                 image_base64 = COALESCE($8, image_base64), \
                 updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.title.as_deref())
            .bind(changes.price.map(|p| p.amount()))
            .bind(changes.description.as_deref())
            .bind(changes.category.as_ref().map(Category::as_str))
            .bind(changes.image.url.as_deref())
            .bind(changes.image.embedded.as_deref())
            .fetch_optional(self.pool())
            .await?;

        row.map(Product::try_from).transpose()
    }

    async fn delete_product(&self, owner: UserId, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
