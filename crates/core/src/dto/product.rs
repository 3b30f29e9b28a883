//! Product bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Category, Price, ProductId, ProductImage, UserId};

/// A stored product as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub user_id: UserId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(flatten)]
    pub image: ProductImage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST`, `PUT` and `PATCH /api/products`.
///
/// Every field is optional; which ones are required depends on the verb.
/// For `PATCH`, an absent field is left untouched while an empty image
/// string clears that image source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl ProductPayload {
    /// Payload that only changes the price.
    #[must_use]
    pub fn price(price: Price) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_accepts_underscore_id() {
        let id = ProductId::generate();
        let owner = UserId::generate();
        let json = serde_json::json!({
            "_id": id.to_string(),
            "userId": owner.to_string(),
            "title": "Mug",
            "price": 9.5,
            "imageUrl": "https://img/mug.png",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.id, id);
        assert_eq!(product.category.as_str(), "general");
        assert_eq!(product.description, "");
        assert_eq!(product.image.url(), "https://img/mug.png");
    }

    #[test]
    fn test_product_serializes_flat_image_fields() {
        let product = Product {
            id: ProductId::generate(),
            user_id: UserId::generate(),
            title: "Mug".to_owned(),
            price: Price::parse("9.5").unwrap(),
            description: String::new(),
            category: Category::default(),
            image: ProductImage::None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["imageUrl"], "");
        assert_eq!(json["imageBase64"], "");
        assert_eq!(json["price"], 9.5);
        assert_eq!(json["category"], "general");
    }

    #[test]
    fn test_payload_distinguishes_absent_from_empty() {
        let payload: ProductPayload =
            serde_json::from_str(r#"{"price": "12", "imageUrl": ""}"#).unwrap();
        assert_eq!(payload.price, Some(Price::parse("12").unwrap()));
        assert_eq!(payload.image_url.as_deref(), Some(""));
        assert!(payload.title.is_none());
        assert!(payload.image_base64.is_none());
    }

    #[test]
    fn test_payload_null_price_is_absent() {
        let payload: ProductPayload =
            serde_json::from_str(r#"{"title": "Mug", "price": null}"#).unwrap();
        assert!(payload.price.is_none());
    }
}
