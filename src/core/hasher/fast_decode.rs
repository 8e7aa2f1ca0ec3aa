//! Fast image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG files (1.5-2x faster than image crate),
//! falls back to image crate for other formats. The fallback detects the
//! format from the file's bytes, so a PNG saved as `.jpg` still decodes.

use crate::core::scanner::ImageFormat;
use crate::error::HashError;
use image::{DynamicImage, ImageBuffer, ImageReader, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Fast image decoder that uses optimized decoders per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an image from a file path using the fastest available decoder.
    pub fn decode(path: &Path) -> Result<DynamicImage, HashError> {
        match ImageFormat::from_path(path) {
            ImageFormat::Jpeg => Self::decode_jpeg(path).or_else(|_| Self::decode_fallback(path)),
            _ => Self::decode_fallback(path),
        }
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(path: &Path) -> Result<DynamicImage, HashError> {
        let file_bytes = fs::read(path).map_err(|e| HashError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(&file_bytes, options);

        let pixels = decoder.decode().map_err(|e| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: "Failed to get image info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;
        let buffer_error = |kind: &str| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("Failed to create {} buffer", kind),
        };

        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGB"))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGBA"))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("Luma"))?;
                DynamicImage::ImageLuma8(buffer)
            }
            // Unsupported colorspace, let the image crate handle it
            _ => return Self::decode_fallback(path),
        };

        Ok(image)
    }

    /// Fallback to image crate, sniffing the format from content
    fn decode_fallback(path: &Path) -> Result<DynamicImage, HashError> {
        let io_error = |e| HashError::IoError {
            path: path.to_path_buf(),
            source: e,
        };

        ImageReader::open(path)
            .map_err(io_error)?
            .with_guessed_format()
            .map_err(io_error)?
            .decode()
            .map_err(|e| HashError::DecodeError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}
