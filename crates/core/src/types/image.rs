//! Product image source.
//!
//! A product shows at most one image, which is either a remote URL or an
//! embedded data URL produced by the client's downscaler. On the wire the two
//! sources are separate string fields (`imageUrl`, `imageBase64`) where an
//! empty string means "not set".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when image fields contradict each other.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageSourceError {
    /// Both a URL and embedded data were supplied in the same request.
    #[error("imageUrl and imageBase64 are mutually exclusive")]
    Conflicting,
}

/// Where a product image comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ImageFields", into = "ImageFields")]
pub enum ProductImage {
    #[default]
    None,
    /// A remote image URL.
    Url(String),
    /// An embedded `data:` URL.
    Embedded(String),
}

impl ProductImage {
    /// Build an image from its two wire fields.
    ///
    /// # Errors
    ///
    /// Returns [`ImageSourceError::Conflicting`] if both fields are non-empty.
    pub fn from_parts(url: &str, embedded: &str) -> Result<Self, ImageSourceError> {
        match (url.is_empty(), embedded.is_empty()) {
            (true, true) => Ok(Self::None),
            (false, true) => Ok(Self::Url(url.to_owned())),
            (true, false) => Ok(Self::Embedded(embedded.to_owned())),
            (false, false) => Err(ImageSourceError::Conflicting),
        }
    }

    /// Apply a partial update.
    ///
    /// A non-empty value replaces the image entirely, so setting a URL clears
    /// embedded data and vice versa. An empty string clears only the matching
    /// source. `None` leaves that source alone.
    ///
    /// # Errors
    ///
    /// Returns [`ImageSourceError::Conflicting`] if both values are non-empty.
    pub fn apply(
        &self,
        url: Option<&str>,
        embedded: Option<&str>,
    ) -> Result<Self, ImageSourceError> {
        ImageUpdate::new(url, embedded)?.apply_to(self)
    }

    /// The remote URL, or `""` when unset.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(u) => u,
            _ => "",
        }
    }

    /// The embedded data URL, or `""` when unset.
    #[must_use]
    pub fn embedded(&self) -> &str {
        match self {
            Self::Embedded(e) => e,
            _ => "",
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// A partial image change expressed as writes to the two stored columns.
///
/// `None` keeps the stored column. Because a non-empty source always comes
/// with an empty write to the other column, the result of applying an update
/// never holds both sources, whatever the stored state was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUpdate {
    pub url: Option<String>,
    pub embedded: Option<String>,
}

impl ImageUpdate {
    /// Translate optional wire fields into column writes.
    ///
    /// # Errors
    ///
    /// Returns [`ImageSourceError::Conflicting`] if both values are non-empty.
    pub fn new(url: Option<&str>, embedded: Option<&str>) -> Result<Self, ImageSourceError> {
        let url = url.map(str::trim);
        let (url, embedded) = match (url, embedded) {
            (Some(u), Some(e)) if !u.is_empty() && !e.is_empty() => {
                return Err(ImageSourceError::Conflicting);
            }
            (Some(u), _) if !u.is_empty() => (Some(u), Some("")),
            (_, Some(e)) if !e.is_empty() => (Some(""), Some(e)),
            (url, embedded) => (url, embedded),
        };
        Ok(Self {
            url: url.map(str::to_owned),
            embedded: embedded.map(str::to_owned),
        })
    }

    /// Whether applying this update changes nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.url.is_none() && self.embedded.is_none()
    }

    /// Apply the column writes to a stored image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageSourceError::Conflicting`] only if `current` itself was
    /// inconsistent.
    pub fn apply_to(&self, current: &ProductImage) -> Result<ProductImage, ImageSourceError> {
        ProductImage::from_parts(
            self.url.as_deref().unwrap_or(current.url()),
            self.embedded.as_deref().unwrap_or(current.embedded()),
        )
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageFields {
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    image_base64: String,
}

impl TryFrom<ImageFields> for ProductImage {
    type Error = ImageSourceError;

    fn try_from(fields: ImageFields) -> Result<Self, Self::Error> {
        Self::from_parts(&fields.image_url, &fields.image_base64)
    }
}

impl From<ProductImage> for ImageFields {
    fn from(image: ProductImage) -> Self {
        match image {
            ProductImage::None => Self {
                image_url: String::new(),
                image_base64: String::new(),
            },
            ProductImage::Url(image_url) => Self {
                image_url,
                image_base64: String::new(),
            },
            ProductImage::Embedded(image_base64) => Self {
                image_url: String::new(),
                image_base64,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DATA: &str = "data:image/jpeg;base64,AAAA";

    #[test]
    fn test_from_parts() {
        assert_eq!(ProductImage::from_parts("", "").unwrap(), ProductImage::None);
        assert_eq!(
            ProductImage::from_parts("https://x/y.png", "").unwrap().url(),
            "https://x/y.png"
        );
        assert_eq!(
            ProductImage::from_parts("https://x/y.png", DATA),
            Err(ImageSourceError::Conflicting)
        );
    }

    #[test]
    fn test_setting_url_clears_embedded() {
        let image = ProductImage::Embedded(DATA.to_owned());
        let next = image.apply(Some("https://x/y.png"), None).unwrap();
        assert_eq!(next.url(), "https://x/y.png");
        assert_eq!(next.embedded(), "");
    }

    #[test]
    fn test_setting_embedded_clears_url() {
        let image = ProductImage::Url("https://x/y.png".to_owned());
        let next = image.apply(None, Some(DATA)).unwrap();
        assert_eq!(next.embedded(), DATA);
        assert_eq!(next.url(), "");
    }

    #[test]
    fn test_empty_clears_only_matching_field() {
        let image = ProductImage::Url("https://x/y.png".to_owned());
        assert_eq!(image.apply(None, Some("")).unwrap(), image);
        assert_eq!(image.apply(Some(""), None).unwrap(), ProductImage::None);
    }

    #[test]
    fn test_absent_fields_keep_image() {
        let image = ProductImage::Embedded(DATA.to_owned());
        assert_eq!(image.apply(None, None).unwrap(), image);
    }

    #[test]
    fn test_both_non_empty_conflict() {
        let result = ProductImage::None.apply(Some("https://x/y.png"), Some(DATA));
        assert_eq!(result, Err(ImageSourceError::Conflicting));
    }

    #[test]
    fn test_update_column_writes() {
        let set_url = ImageUpdate::new(Some(" https://x/y.png "), None).unwrap();
        assert_eq!(set_url.url.as_deref(), Some("https://x/y.png"));
        assert_eq!(set_url.embedded.as_deref(), Some(""));

        let clear_embedded = ImageUpdate::new(None, Some("")).unwrap();
        assert_eq!(clear_embedded.url, None);
        assert_eq!(clear_embedded.embedded.as_deref(), Some(""));

        assert!(ImageUpdate::new(None, None).unwrap().is_noop());
    }

    #[test]
    fn test_wire_fields() {
        let json = serde_json::to_value(ProductImage::Url("u".to_owned())).unwrap();
        assert_eq!(json, serde_json::json!({"imageUrl": "u", "imageBase64": ""}));

        let parsed: ProductImage = serde_json::from_str(r#"{"imageBase64": "d"}"#).unwrap();
        assert_eq!(parsed, ProductImage::Embedded("d".to_owned()));
    }
}
