//! File filtering logic for the lister.

use super::ImageFormat;
use std::path::Path;

/// Decides whether a path is a candidate image.
///
/// The accepted set is fixed: jpg, jpeg, png, bmp, webp, gif, tiff, tif,
/// matched case-insensitively. Hidden files are not special-cased.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilter;

impl ImageFilter {
    /// Create a new filter
    pub fn new() -> Self {
        Self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        self.get_format(path).is_supported()
    }

    /// Get the image format for a path
    pub fn get_format(&self, path: &Path) -> ImageFormat {
        ImageFormat::from_path(path)
    }
}
