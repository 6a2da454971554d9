//! Fast image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG files (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::error::LoadError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// JPEG start-of-image marker
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

fn has_jpeg_extension(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("jpg" | "jpeg")
    )
}

/// Fast image decoder that picks the best decoder per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an image from a file path using the fastest available decoder.
    ///
    /// - JPEG: zune-jpeg (1.5-2x faster)
    /// - Other formats: image crate fallback
    pub fn decode(path: &Path) -> Result<DynamicImage, LoadError> {
        if has_jpeg_extension(path) {
            Self::decode_jpeg(path).or_else(|_| Self::decode_fallback(path))
        } else {
            Self::decode_fallback(path)
        }
    }

    /// Decode an image already held in memory.
    ///
    /// `origin` is only used to name the source in errors; for sources that
    /// never touched the filesystem any identifying path works.
    pub fn decode_bytes(bytes: &[u8], origin: &Path) -> Result<DynamicImage, LoadError> {
        if bytes.starts_with(&JPEG_SOI) {
            if let Ok(image) = Self::decode_jpeg_bytes(bytes, origin) {
                return Ok(image);
            }
        }

        image::load_from_memory(bytes).map_err(|e| LoadError::Decode {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(path: &Path) -> Result<DynamicImage, LoadError> {
        let file_bytes = fs::read(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::decode_jpeg_bytes(&file_bytes, path)
    }

    fn decode_jpeg_bytes(bytes: &[u8], origin: &Path) -> Result<DynamicImage, LoadError> {
        // Configure decoder to output RGB
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder.decode().map_err(|e| LoadError::Decode {
            path: origin.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| LoadError::Decode {
            path: origin.to_path_buf(),
            reason: "Failed to get image info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;

        // Get actual output colorspace after decoding
        let out_colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB);

        let image = match out_colorspace {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        LoadError::Decode {
                            path: origin.to_path_buf(),
                            reason: "Failed to create RGB buffer".to_string(),
                        }
                    })?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        LoadError::Decode {
                            path: origin.to_path_buf(),
                            reason: "Failed to create RGBA buffer".to_string(),
                        }
                    })?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        LoadError::Decode {
                            path: origin.to_path_buf(),
                            reason: "Failed to create Luma buffer".to_string(),
                        }
                    })?;
                DynamicImage::ImageLuma8(buffer)
            }
            other => {
                return Err(LoadError::Decode {
                    path: origin.to_path_buf(),
                    reason: format!("Unsupported JPEG colorspace: {:?}", other),
                });
            }
        };

        Ok(image)
    }

    /// Fallback to image crate for non-JPEG formats
    fn decode_fallback(path: &Path) -> Result<DynamicImage, LoadError> {
        image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => LoadError::Decode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }
}
