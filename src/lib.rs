//! # Image Dupe Finder
//!
//! Finds visually duplicate or near-duplicate images in a folder.
//!
//! Every image gets a 64-bit perceptual fingerprint. Images whose
//! fingerprints are within a Hamming-distance threshold of a cluster seed
//! are grouped together, and each group is returned with per-file metadata
//! sorted largest file first.
//!
//! ## Architecture
//! - `core` - The fingerprinting and clustering engine
//! - `events` - Event-driven progress reporting
//! - `error` - Error types for every pipeline stage
//!
//! ## Example
//! ```rust,ignore
//! let report = image_dupe_finder::run_pipeline("/uploads/session", 10)?;
//! println!("{} groups out of {} images", report.clusters.len(), report.total_images);
//! ```

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::pipeline::{run_pipeline, ScanReport};
pub use error::{DupeFinderError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. The filter is
/// read from `RUST_LOG`, falling back to `default_filter`.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| DupeFinderError::Config(format!("failed to install tracing subscriber: {}", e)))
}
