//! SIMD-accelerated resizing to the canonical grayscale canvas.
//!
//! Uses fast_image_resize (2-4x faster than the image crate resize)
//! with bilinear filtering. Aspect ratio is intentionally not
//! preserved: every icon is stretched onto the same square canvas so
//! that correlation always compares pixels at identical positions.

use crate::error::LoadError;
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// Convert to grayscale and stretch onto a `width` x `height` canvas.
///
/// `origin` names the source in errors. Zero-sized inputs are rejected
/// before they reach the resizer.
pub fn resize_to_gray(
    image: &DynamicImage,
    width: u32,
    height: u32,
    origin: &Path,
) -> Result<GrayImage, LoadError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(LoadError::EmptyImage {
            path: origin.to_path_buf(),
        });
    }

    let gray = image.to_luma8();
    if gray.dimensions() == (width, height) {
        return Ok(gray);
    }

    let src = Image::from_vec_u8(gray.width(), gray.height(), gray.into_raw(), PixelType::U8)
        .map_err(|e| LoadError::Decode {
            path: origin.to_path_buf(),
            reason: format!("Failed to wrap source buffer: {}", e),
        })?;

    let mut dst = Image::new(width, height, PixelType::U8);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    resizer
        .resize(&src, &mut dst, &options)
        .map_err(|e| LoadError::Decode {
            path: origin.to_path_buf(),
            reason: format!("Resize failed: {}", e),
        })?;

    GrayImage::from_raw(width, height, dst.into_vec()).ok_or_else(|| LoadError::Decode {
        path: origin.to_path_buf(),
        reason: "Resized buffer has unexpected size".to_string(),
    })
}
