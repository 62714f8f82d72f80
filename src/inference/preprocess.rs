//! # Image Preprocessing
//!
//! Turns raw file bytes into the flat grayscale vector the classifier reads.
//!
//! ## Steps
//! 1. Decode (any format the `image` crate supports)
//! 2. Drop the alpha channel (RGBA → RGB)
//! 3. Resize to `side × side`, ignoring aspect ratio
//! 4. Convert to 8-bit luma and scale to `[0, 1]`
//!
//! Output is row-major, `side * side` values long.

use image::imageops::FilterType;
use image::DynamicImage;

use crate::common::error::InferenceError;

/// Decode and normalize an image for a model with `side × side` input.
///
/// # Errors
/// - The bytes are not a decodable image
/// - `side` is zero
pub fn preprocess(image_bytes: &[u8], side: u32) -> Result<Vec<f32>, InferenceError> {
    if side == 0 {
        return Err(InferenceError::InvalidModel(
            "input size must be positive".to_string(),
        ));
    }

    let img = image::load_from_memory(image_bytes)?;

    // X-rays exported as PNG often carry an alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let resized = rgb.resize_exact(side, side, FilterType::Triangle);
    let gray = resized.to_luma8();

    Ok(gray.pixels().map(|p| p.0[0] as f32 / 255.0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_output_shape_and_range() {
        let data = preprocess(&png(10, 7, [255, 255, 255, 128]), 4).unwrap();
        assert_eq!(data.len(), 16);
        assert!(data.iter().all(|v| (*v - 1.0).abs() < 1e-6));

        let black = preprocess(&png(3, 3, [0, 0, 0, 255]), 2).unwrap();
        assert!(black.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_alpha_is_ignored() {
        let opaque = preprocess(&png(5, 5, [120, 60, 30, 255]), 3).unwrap();
        let transparent = preprocess(&png(5, 5, [120, 60, 30, 0]), 3).unwrap();
        assert_eq!(opaque, transparent);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            preprocess(b"definitely not an image", 4),
            Err(InferenceError::Decode(_))
        ));
        assert!(preprocess(&png(2, 2, [0, 0, 0, 255]), 0).is_err());
    }
}
