//! Icon normalization pipeline.
//!
//! Every icon that enters the engine passes through the same fixed
//! pipeline before it can be scored:
//!
//! 1. Decode (zune-jpeg fast path, image crate fallback)
//! 2. Grayscale conversion, discarding color and alpha
//! 3. Bilinear stretch onto the 64x64 canonical canvas
//! 4. 3x3 Gaussian smoothing to suppress antialiasing artifacts
//!
//! The order is fixed. Correlation scores are only meaningful between
//! rasters produced by this exact pipeline.
//!
//! # Example
//!
//! ```no_run
//! use icon_match::core::normalizer::Normalizer;
//! use std::path::Path;
//!
//! let normalizer = Normalizer::new();
//! let raster = normalizer.normalize_file(Path::new("icons/save.png"))?;
//! assert_eq!(raster.dimensions(), (64, 64));
//! # Ok::<(), icon_match::error::LoadError>(())
//! ```

mod fast_decode;
mod resize;
mod smooth;

pub use fast_decode::FastDecoder;

use crate::error::LoadError;
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// Side length of the canonical square canvas every icon is stretched onto.
pub const CANONICAL_SIZE: u32 = 64;

/// A normalized grayscale raster, one byte per sample in row-major order.
///
/// Rasters produced by [`Normalizer`] are always
/// [`CANONICAL_SIZE`] x [`CANONICAL_SIZE`]; the type itself allows any
/// non-empty dimensions so tests can build small fixtures directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRaster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl IconRaster {
    /// Wrap a decoded grayscale buffer without copying.
    ///
    /// Returns `None` when either dimension is zero, like [`Self::from_raw`].
    pub fn from_gray(image: GrayImage) -> Option<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: image.into_raw(),
        })
    }

    /// Build a raster from raw row-major bytes.
    ///
    /// Returns `None` when the buffer length does not match the
    /// dimensions or when either dimension is zero.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Row-major sample bytes, `width * height` of them.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Runs the fixed normalization pipeline.
///
/// Stateless and cheap to clone; a single instance can be shared
/// across worker threads.
#[derive(Debug, Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize an icon read from disk.
    pub fn normalize_file(&self, path: &Path) -> Result<IconRaster, LoadError> {
        let image = FastDecoder::decode(path)?;
        self.normalize_image(&image, path)
    }

    /// Normalize an icon already held in memory as encoded bytes.
    ///
    /// `origin` names the source in errors.
    pub fn normalize_bytes(&self, bytes: &[u8], origin: &Path) -> Result<IconRaster, LoadError> {
        let image = FastDecoder::decode_bytes(bytes, origin)?;
        self.normalize_image(&image, origin)
    }

    /// Normalize an already decoded image.
    pub fn normalize_image(
        &self,
        image: &DynamicImage,
        origin: &Path,
    ) -> Result<IconRaster, LoadError> {
        let gray = resize::resize_to_gray(image, CANONICAL_SIZE, CANONICAL_SIZE, origin)?;
        IconRaster::from_gray(smooth::gaussian_3x3(&gray)).ok_or_else(|| LoadError::EmptyImage {
            path: origin.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgba};

    fn origin() -> &'static Path {
        Path::new("test://normalizer")
    }

    fn sample_rgba(width: u32, height: u32) -> DynamicImage {
        let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x * 2) as u8, (y * 3) as u8, 90, 255])
        });
        DynamicImage::ImageRgba8(buffer)
    }

    #[test]
    fn raster_from_raw_validates_buffer_length() {
        assert!(IconRaster::from_raw(4, 4, vec![0u8; 16]).is_some());
        assert!(IconRaster::from_raw(4, 4, vec![0u8; 15]).is_none());
        assert!(IconRaster::from_raw(0, 4, Vec::new()).is_none());
    }

    #[test]
    fn raster_from_gray_rejects_empty_images() {
        assert!(IconRaster::from_gray(GrayImage::new(0, 0)).is_none());
        assert!(IconRaster::from_gray(GrayImage::new(4, 0)).is_none());
        assert!(IconRaster::from_gray(GrayImage::from_pixel(2, 2, Luma([9]))).is_some());
    }

    #[test]
    fn raster_accessors_expose_dimensions_and_samples() {
        let raster = IconRaster::from_raw(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.dimensions(), (3, 2));
        assert_eq!(raster.pixels(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn normalize_image_always_yields_canonical_dimensions() {
        let normalizer = Normalizer::new();

        for (w, h) in [(10, 10), (100, 40), (64, 64), (3, 200)] {
            let raster = normalizer.normalize_image(&sample_rgba(w, h), origin()).unwrap();
            assert_eq!(raster.dimensions(), (CANONICAL_SIZE, CANONICAL_SIZE));
        }
    }

    #[test]
    fn normalization_is_deterministic() {
        let normalizer = Normalizer::new();
        let image = sample_rgba(48, 48);

        let first = normalizer.normalize_image(&image, origin()).unwrap();
        let second = normalizer.normalize_image(&image, origin()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn normalize_bytes_matches_normalize_image() {
        let normalizer = Normalizer::new();
        let image = sample_rgba(30, 20);

        // PNG encoding is lossless, both paths must agree
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let from_bytes = normalizer.normalize_bytes(&bytes, origin()).unwrap();
        let from_image = normalizer.normalize_image(&image, origin()).unwrap();
        assert_eq!(from_bytes, from_image);
    }

    #[test]
    fn solid_white_stays_white_through_the_pipeline() {
        let normalizer = Normalizer::new();
        let white = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 10, Luma([255])));

        let raster = normalizer.normalize_image(&white, origin()).unwrap();
        assert!(raster.pixels().iter().all(|&p| p == 255));
    }

    #[test]
    fn corrupt_bytes_fail_with_decode_error() {
        let normalizer = Normalizer::new();
        let result = normalizer.normalize_bytes(b"\x89PNG but not really", origin());
        assert!(matches!(result, Err(LoadError::Decode { .. })));
    }

    #[test]
    fn missing_file_fails_with_io_error() {
        let normalizer = Normalizer::new();
        let result = normalizer.normalize_file(Path::new("/nonexistent/icon.png"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
