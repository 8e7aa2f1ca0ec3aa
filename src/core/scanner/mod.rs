//! # Scanner Module
//!
//! Lists candidate image files under a folder.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - BMP (.bmp)
//! - WebP (.webp)
//! - GIF (.gif)
//! - TIFF (.tiff, .tif)
//!
//! Listing never opens a file. A missing root folder lists as empty.
//!
//! ## Example
//! ```rust,ignore
//! use image_dupe_finder::core::scanner::{ImageLister, ScanConfig, WalkDirLister};
//!
//! let lister = WalkDirLister::new(ScanConfig::default());
//! let result = lister.list(Path::new("/uploads/session"));
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{ScanConfig, WalkDirLister};

use crate::error::ScanError;
use crate::events::EventSender;
use std::path::{Path, PathBuf};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
    WebP,
    Gif,
    Tiff,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "bmp" => ImageFormat::Bmp,
            "webp" => ImageFormat::WebP,
            "gif" => ImageFormat::Gif,
            "tiff" | "tif" => ImageFormat::Tiff,
            _ => ImageFormat::Unknown,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }

    /// Check if this format is supported
    pub fn is_supported(&self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}

/// Result of listing a folder
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Candidate images, in deterministic order
    pub images: Vec<PathBuf>,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for image listers
pub trait ImageLister: Send + Sync {
    /// List candidate images under `root`
    fn list(&self, root: &Path) -> ScanResult {
        self.list_with_events(root, &crate::events::null_sender())
    }

    /// List with progress reporting via events
    fn list_with_events(&self, root: &Path, events: &EventSender) -> ScanResult;
}

/// List candidate images under `root` with the default configuration.
pub fn list_images(root: &Path) -> Vec<PathBuf> {
    WalkDirLister::new(ScanConfig::default()).list(root).images
}
