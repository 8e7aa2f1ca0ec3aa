//! # Core Module
//!
//! The duplicate detection engine, independent of any front end.
//!
//! ## Modules
//! - `scanner` - Lists image files under a folder
//! - `hasher` - Computes 64-bit perceptual fingerprints
//! - `comparator` - Clusters fingerprints by Hamming distance
//! - `metadata` - Reads size, dimensions and modified time
//! - `pipeline` - Orchestrates the full workflow

pub mod comparator;
pub mod hasher;
pub mod metadata;
pub mod pipeline;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{Cluster, GroupingMode};
pub use hasher::{Fingerprint, HashedImage, HashingMode};
pub use metadata::ImageMetadata;
pub use pipeline::{Pipeline, PipelineResult, ScanReport};
