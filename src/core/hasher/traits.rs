//! Fingerprint types and the hashing trait.

use super::fast_decode::FastDecoder;
use crate::error::HashError;
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A 64-bit perceptual fingerprint.
///
/// Two fingerprints are compared by Hamming distance: the number of bit
/// positions that differ. Lower distance means more similar images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Number of bits in a fingerprint
    pub const BITS: u32 = u64::BITS;

    /// Wrap raw fingerprint bits
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw fingerprint bits
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance to another fingerprint
    pub fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Similarity as a percentage (0-100)
    pub fn similarity(&self, other: &Self) -> f64 {
        (1.0 - (self.distance(other) as f64 / Self::BITS as f64)) * 100.0
    }

    /// Hexadecimal form, always 16 characters
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// An image that decoded and produced a fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedImage {
    /// Path of the source image
    pub path: PathBuf,
    /// Its perceptual fingerprint
    pub fingerprint: Fingerprint,
}

impl HashedImage {
    pub fn new(path: impl Into<PathBuf>, fingerprint: Fingerprint) -> Self {
        Self {
            path: path.into(),
            fingerprint,
        }
    }
}

/// Outcome of one hashing attempt
#[derive(Debug, Clone)]
pub enum HashOutcome {
    /// The image decoded and was fingerprinted
    Hashed(HashedImage),
    /// The image could not be used and is left out of clustering
    Skipped { path: PathBuf, reason: String },
}

impl HashOutcome {
    /// Path this outcome is about
    pub fn path(&self) -> &Path {
        match self {
            HashOutcome::Hashed(hashed) => &hashed.path,
            HashOutcome::Skipped { path, .. } => path,
        }
    }

    /// Whether a fingerprint was produced
    pub fn is_hashed(&self) -> bool {
        matches!(self, HashOutcome::Hashed(_))
    }

    /// The hashed image, if any
    pub fn into_hashed(self) -> Option<HashedImage> {
        match self {
            HashOutcome::Hashed(hashed) => Some(hashed),
            HashOutcome::Skipped { .. } => None,
        }
    }
}

/// Trait for fingerprint algorithms
pub trait HashAlgorithm: Send + Sync {
    /// Compute a fingerprint from an already-decoded image
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError>;

    /// Decode a file and compute its fingerprint.
    ///
    /// JPEGs go through zune-jpeg first; everything else uses the image
    /// crate.
    fn hash_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let image = FastDecoder::decode(path)?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(HashError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        self.hash_image(&image)
    }
}
