//! Perceptual Hash (pHash) implementation.
//!
//! pHash works by:
//! 1. Converting the image to grayscale and shrinking it
//! 2. Taking the 2-D discrete cosine transform (DCT)
//! 3. Keeping the 8x8 block of lowest frequencies
//! 4. Setting a bit for every coefficient above the block's median
//!
//! Low frequencies describe the overall structure of an image, so the
//! result survives rescaling, recompression and small brightness shifts.
//!
//! The transform and median step come from the image_hasher crate. Large
//! photos are first shrunk to a 32x32 grayscale sample with
//! fast_image_resize, which is much cheaper than letting the hasher
//! resample the full-size image.

use super::fast_resize::resize_to_grayscale;
use super::traits::{Fingerprint, HashAlgorithm};
use crate::error::HashError;
use image::DynamicImage;
use image_hasher::{HashAlg, Hasher, HasherConfig};

/// Side of the grayscale sample handed to the hasher
const SAMPLE_SIZE: u32 = 32;

/// Side of the low-frequency block that becomes the fingerprint
const BLOCK_SIZE: u32 = 8;

/// DCT-based perceptual hasher producing 64-bit fingerprints
pub struct PerceptualHasher {
    /// Internal hasher from image_hasher crate
    hasher: Hasher,
}

impl PerceptualHasher {
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_size(BLOCK_SIZE, BLOCK_SIZE)
            .preproc_dct()
            .hash_alg(HashAlg::Median)
            .to_hasher();

        Self { hasher }
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl HashAlgorithm for PerceptualHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        let gray = resize_to_grayscale(image, SAMPLE_SIZE, SAMPLE_SIZE)?;
        let hash = self.hasher.hash_image(&DynamicImage::ImageLuma8(gray));

        let bytes: [u8; 8] = hash
            .as_bytes()
            .try_into()
            .map_err(|_| HashError::HashLength(hash.as_bytes().len()))?;

        Ok(Fingerprint::new(u64::from_be_bytes(bytes)))
    }
}
