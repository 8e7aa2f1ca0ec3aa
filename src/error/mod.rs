//! # Error Module
//!
//! Error types for the duplicate image finder.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Absorb per-image failures** at the stage that hit them; only
//!   batch-level failures reach the caller

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for a pipeline run
#[derive(Error, Debug)]
pub enum DupeFinderError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while listing images.
///
/// These are recorded and reported, never fatal to a run.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory entry {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while decoding or fingerprinting an image
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image has no pixels: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Resize failed: {0}")]
    ResizeFailed(String),

    #[error("Fingerprint has {0} bytes, expected 8")]
    HashLength(usize),

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while reading metadata for a clustered image
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read file metadata for {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Batch-level failures of a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Scan was cancelled")]
    Cancelled,

    #[error("Failed to start hashing workers: {0}")]
    WorkerPool(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DupeFinderError>;
