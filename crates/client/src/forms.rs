//! Form state for the auth screens and the product editor.
//!
//! Forms hold raw user input as strings. `validate`/`to_payload` check the
//! required fields locally and build the request body, so an incomplete form
//! never reaches the server.

use catalog_core::dto::{LoginRequest, Product, ProductPayload, SignupRequest};
use catalog_core::{Price, ProductId};

use crate::error::ClientError;

const CREDENTIALS_REQUIRED: &str = "Email and password are required";
const TITLE_AND_PRICE_REQUIRED: &str = "Title and price are required";
const INVALID_PRICE: &str = "Price must be a non-negative number";

/// Sign-in form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check required fields and build the request body.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if email or password is blank.
    pub fn validate(&self) -> Result<LoginRequest, ClientError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(ClientError::Validation(CREDENTIALS_REQUIRED.to_owned()));
        }
        Ok(LoginRequest {
            email: email.to_owned(),
            password: self.password.clone(),
        })
    }
}

/// Registration form. The display name is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check required fields and build the request body.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if email or password is blank.
    pub fn validate(&self) -> Result<SignupRequest, ClientError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(ClientError::Validation(CREDENTIALS_REQUIRED.to_owned()));
        }
        let name = self.name.trim();
        Ok(SignupRequest {
            email: email.to_owned(),
            password: self.password.clone(),
            name: (!name.is_empty()).then(|| name.to_owned()),
        })
    }
}

/// Create/edit product form.
///
/// At most one image source is held at a time: typing a URL drops an
/// attached upload and attaching an upload drops the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub title: String,
    pub price: String,
    pub description: String,
    pub category: String,
    image_url: String,
    image_base64: String,
    editing: Option<ProductId>,
}

impl ProductForm {
    /// An empty form for a new product.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A form seeded from an existing product. Submitting it replaces that
    /// product.
    #[must_use]
    pub fn edit(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price.to_string(),
            description: product.description.clone(),
            category: product.category.to_string(),
            image_url: product.image.url().to_owned(),
            image_base64: product.image.embedded().to_owned(),
            editing: Some(product.id),
        }
    }

    /// The product being edited, or `None` for a new one.
    #[must_use]
    pub const fn editing(&self) -> Option<ProductId> {
        self.editing
    }

    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    #[must_use]
    pub fn image_base64(&self) -> &str {
        &self.image_base64
    }

    /// Set the image URL and drop any attached upload.
    pub fn set_image_url(&mut self, url: impl Into<String>) {
        self.image_url = url.into();
        self.image_base64.clear();
    }

    /// Attach an embedded image (a `data:` URL) and drop the image URL.
    pub fn attach_image(&mut self, data_url: impl Into<String>) {
        self.image_base64 = data_url.into();
        self.image_url.clear();
    }

    pub fn clear_image(&mut self) {
        self.image_url.clear();
        self.image_base64.clear();
    }

    /// Build a create/replace body.
    ///
    /// Every field is sent, so an empty category falls back to the server's
    /// default and empty image fields clear the stored image.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the title or price is blank or
    /// the price is not a non-negative number.
    pub fn to_payload(&self) -> Result<ProductPayload, ClientError> {
        let title = self.title.trim();
        let price = self.price.trim();
        if title.is_empty() || price.is_empty() {
            return Err(ClientError::Validation(TITLE_AND_PRICE_REQUIRED.to_owned()));
        }
        let price =
            Price::parse(price).map_err(|_| ClientError::Validation(INVALID_PRICE.to_owned()))?;

        Ok(ProductPayload {
            title: Some(title.to_owned()),
            price: Some(price),
            description: Some(self.description.clone()),
            category: Some(self.category.trim().to_owned()),
            image_url: Some(self.image_url.trim().to_owned()),
            image_base64: Some(self.image_base64.clone()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use catalog_core::{Category, ProductImage, UserId};

    use super::*;

    fn validation_message(err: ClientError) -> String {
        match err {
            ClientError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_login_form_requires_both_fields() {
        let err = LoginForm::new("  ", "pw").validate().unwrap_err();
        assert_eq!(validation_message(err), CREDENTIALS_REQUIRED);
        let err = LoginForm::new("ada@example.com", "").validate().unwrap_err();
        assert_eq!(validation_message(err), CREDENTIALS_REQUIRED);

        let request = LoginForm::new(" ada@example.com ", "pw").validate().unwrap();
        assert_eq!(request.email, "ada@example.com");
    }

    #[test]
    fn test_signup_form_blank_name_is_omitted() {
        let request = SignupForm::new("ada@example.com", "pw")
            .with_name("  ")
            .validate()
            .unwrap();
        assert!(request.name.is_none());

        let request = SignupForm::new("ada@example.com", "pw")
            .with_name("Ada")
            .validate()
            .unwrap();
        assert_eq!(request.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_image_sources_are_exclusive() {
        let mut form = ProductForm::new();
        form.set_image_url("https://img/mug.png");
        form.attach_image("data:image/jpeg;base64,AA");
        assert_eq!(form.image_url(), "");
        assert_eq!(form.image_base64(), "data:image/jpeg;base64,AA");

        form.set_image_url("https://img/hat.png");
        assert_eq!(form.image_url(), "https://img/hat.png");
        assert_eq!(form.image_base64(), "");
    }

    #[test]
    fn test_payload_requires_title_and_price() {
        let mut form = ProductForm::new();
        form.title = "Mug".to_owned();
        let err = form.to_payload().unwrap_err();
        assert_eq!(validation_message(err), TITLE_AND_PRICE_REQUIRED);

        form.price = "-1".to_owned();
        let err = form.to_payload().unwrap_err();
        assert_eq!(validation_message(err), INVALID_PRICE);

        form.price = "9.50".to_owned();
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.price, Some(Price::parse("9.5").unwrap()));
        assert_eq!(payload.category.as_deref(), Some(""));
        assert_eq!(payload.image_url.as_deref(), Some(""));
    }

    #[test]
    fn test_edit_seeds_from_product() {
        let product = Product {
            id: ProductId::generate(),
            user_id: UserId::generate(),
            title: "Mug".to_owned(),
            price: Price::parse("9.5").unwrap(),
            description: "Blue".to_owned(),
            category: Category::new("kitchen"),
            image: ProductImage::Url("https://img/mug.png".to_owned()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let form = ProductForm::edit(&product);
        assert_eq!(form.editing(), Some(product.id));
        assert_eq!(form.price, "9.5");
        assert_eq!(form.category, "kitchen");
        assert_eq!(form.image_url(), "https://img/mug.png");
        assert!(ProductForm::new().editing().is_none());

        let payload = form.to_payload().unwrap();
        assert_eq!(payload.title.as_deref(), Some("Mug"));
        assert_eq!(payload.description.as_deref(), Some("Blue"));
    }
}
