//! # Hasher Module
//!
//! Computes perceptual fingerprints for images.
//!
//! ## How It Works
//! 1. Decode the file (zune-jpeg for JPEG, the image crate otherwise)
//! 2. Convert to grayscale and resize to 32x32
//! 3. Take the low-frequency DCT block and threshold it at its median
//! 4. Compare fingerprints using Hamming distance
//!
//! Files that fail to decode are skipped, never fatal. Each attempt is a
//! [`HashOutcome`] so callers can count and report skips.
//!
//! ## Example
//! ```rust,ignore
//! use image_dupe_finder::core::hasher::compute_fingerprints;
//!
//! let hashed = compute_fingerprints(&paths);
//! ```

pub mod fast_decode;
pub mod fast_resize;
mod perceptual;
mod traits;

pub use perceptual::PerceptualHasher;
pub use traits::{Fingerprint, HashAlgorithm, HashOutcome, HashedImage};

use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the hashing stage spreads work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashingMode {
    /// One image after another on the calling thread
    Sequential,
    /// Across a rayon worker pool; output keeps input order
    #[default]
    Parallel,
}

/// Hash one file, turning every failure into a skip.
///
/// Decoder panics on hostile input are caught here and treated like any
/// other decode failure.
pub fn hash_path(hasher: &dyn HashAlgorithm, path: &Path) -> HashOutcome {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| hasher.hash_file(path)));

    let reason = match attempt {
        Ok(Ok(fingerprint)) => {
            return HashOutcome::Hashed(HashedImage::new(path, fingerprint));
        }
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("decoder panicked: {}", panic_message(payload.as_ref())),
    };

    debug!(path = %path.display(), %reason, "skipping image");
    HashOutcome::Skipped {
        path: path.to_path_buf(),
        reason,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Hash every path with the given algorithm and mode.
///
/// Outcomes are returned in the same order as `paths` regardless of mode.
pub fn hash_all(hasher: &dyn HashAlgorithm, paths: &[PathBuf], mode: HashingMode) -> Vec<HashOutcome> {
    match mode {
        HashingMode::Sequential => paths.iter().map(|p| hash_path(hasher, p)).collect(),
        HashingMode::Parallel => paths.par_iter().map(|p| hash_path(hasher, p)).collect(),
    }
}

/// Fingerprint every decodable image in `paths`, keeping input order.
///
/// Undecodable files are silently left out.
pub fn compute_fingerprints(paths: &[PathBuf]) -> Vec<HashedImage> {
    hash_all(&PerceptualHasher::new(), paths, HashingMode::Sequential)
        .into_iter()
        .filter_map(HashOutcome::into_hashed)
        .collect()
}

/// Parallel variant of [`compute_fingerprints`] with identical output.
pub fn compute_fingerprints_parallel(paths: &[PathBuf]) -> Vec<HashedImage> {
    hash_all(&PerceptualHasher::new(), paths, HashingMode::Parallel)
        .into_iter()
        .filter_map(HashOutcome::into_hashed)
        .collect()
}
