//! Image downscaling for embedded product images.
//!
//! Uploads are shrunk and re-encoded as JPEG before being embedded in a
//! product body, keeping requests well under the server's body limit.

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use thiserror::Error;

/// Prefix of every string returned by [`downscale`].
pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Errors from [`downscale`].
#[derive(Debug, Error)]
pub enum ImageError {
    /// The input is not an image in a supported format.
    #[error("Unsupported or corrupt image: {0}")]
    Decode(#[source] image::ImageError),

    /// JPEG encoding failed.
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// `max_dimension` was zero or `quality` outside 1..=100.
    #[error("Invalid downscale options: {0}")]
    InvalidOptions(&'static str),
}

/// Bounds for [`downscale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownscaleOptions {
    /// Longest allowed side in pixels.
    pub max_dimension: u32,
    /// JPEG quality, 1 to 100.
    pub quality: u8,
}

impl Default for DownscaleOptions {
    fn default() -> Self {
        Self {
            max_dimension: 800,
            quality: 80,
        }
    }
}

/// Shrink an image to fit within `max_dimension` and return it as a JPEG
/// data URL.
///
/// The aspect ratio is preserved. Images already within bounds keep their
/// size and are only re-encoded. Transparency is flattened.
///
/// # Errors
///
/// Returns [`ImageError::Decode`] if `bytes` is not a PNG, JPEG, WebP or GIF
/// image and [`ImageError::InvalidOptions`] for out-of-range options.
pub fn downscale(bytes: &[u8], options: DownscaleOptions) -> Result<String, ImageError> {
    if options.max_dimension == 0 {
        return Err(ImageError::InvalidOptions("max_dimension must be positive"));
    }
    if !(1..=100).contains(&options.quality) {
        return Err(ImageError::InvalidOptions("quality must be between 1 and 100"));
    }

    let mut img = image::load_from_memory(bytes).map_err(ImageError::Decode)?;
    let max = options.max_dimension;
    if img.width() > max || img.height() > max {
        img = img.resize(max, max, FilterType::Triangle);
    }

    let rgb = img.to_rgb8();
    let mut encoded = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut encoded, options.quality)
        .encode_image(&rgb)
        .map_err(ImageError::Encode)?;

    Ok(format!(
        "{DATA_URL_PREFIX}{}",
        STANDARD.encode(encoded.into_inner())
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 128]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn decode(data_url: &str) -> DynamicImage {
        let encoded = data_url.strip_prefix(DATA_URL_PREFIX).unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn test_large_image_fits_bounds() {
        let options = DownscaleOptions {
            max_dimension: 100,
            quality: 70,
        };
        let out = decode(&downscale(&png(400, 200), options).unwrap());
        assert_eq!(out.dimensions(), (100, 50));
    }

    #[test]
    fn test_small_image_is_not_upscaled() {
        let out = decode(&downscale(&png(30, 20), DownscaleOptions::default()).unwrap());
        assert_eq!(out.dimensions(), (30, 20));
    }

    #[test]
    fn test_rejects_garbage_and_bad_options() {
        assert!(matches!(
            downscale(b"not an image", DownscaleOptions::default()),
            Err(ImageError::Decode(_))
        ));

        let zero = DownscaleOptions {
            max_dimension: 0,
            ..DownscaleOptions::default()
        };
        assert!(matches!(
            downscale(&png(4, 4), zero),
            Err(ImageError::InvalidOptions(_))
        ));

        let too_good = DownscaleOptions {
            quality: 101,
            ..DownscaleOptions::default()
        };
        assert!(matches!(
            downscale(&png(4, 4), too_good),
            Err(ImageError::InvalidOptions(_))
        ));
    }
}
