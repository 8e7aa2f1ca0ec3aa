//! Fast SIMD-accelerated image resizing.
//!
//! Uses fast_image_resize, which picks AVX2/NEON code paths when the CPU
//! has them.

use crate::error::HashError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

/// Fast image resizer using SIMD acceleration
pub struct FastResizer {
    resizer: Resizer,
}

impl FastResizer {
    /// Create a new fast resizer
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Convert to grayscale and resize to `width` x `height`.
    ///
    /// Uses a Lanczos3 convolution so that downscaling is antialiased.
    pub fn resize_to_grayscale(
        &mut self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, HashError> {
        // Grayscale first: one channel is cheaper to resize than three
        let gray = image.to_luma8();

        let src_width = gray.width();
        let src_height = gray.height();

        if src_width == 0 || src_height == 0 {
            return Err(HashError::ResizeFailed("invalid source dimensions".to_string()));
        }

        if width == 0 || height == 0 {
            return Err(HashError::ResizeFailed(
                "invalid destination dimensions".to_string(),
            ));
        }

        let src_image = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
            .map_err(|e| HashError::ResizeFailed(format!("failed to create source image: {}", e)))?;

        let mut dst_image = Image::new(width, height, PixelType::U8);

        let options =
            ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| HashError::ResizeFailed(e.to_string()))?;

        let result_buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(width, height, dst_image.into_vec()).ok_or_else(|| {
                HashError::ResizeFailed("failed to create result buffer".to_string())
            })?;

        Ok(result_buffer)
    }
}

impl Default for FastResizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function for one-off resizing
pub fn resize_to_grayscale(
    image: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<GrayImage, HashError> {
    FastResizer::new().resize_to_grayscale(image, width, height)
}
