//! # Comparator Module
//!
//! Groups fingerprinted images into clusters of similar images.
//!
//! ## How It Works
//! 1. Compare fingerprints using Hamming distance
//! 2. Apply the threshold strategy to decide similarity
//! 3. Form clusters with the selected grouping mode
//!
//! ## Grouping Modes
//! | Mode        | Similar to...          | Chains A~B~C        |
//! |-------------|------------------------|---------------------|
//! | `Star`      | the cluster seed       | split unless A~C    |
//! | `Connected` | any member             | always merged       |
//!
//! `Star` is the default.

mod grouper;
mod traits;

pub use grouper::{ConnectedGrouper, Grouper, StarGrouper};
pub use traits::{ComparisonStrategy, ThresholdStrategy};

use crate::core::hasher::HashedImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An ordered group of two or more similar images.
///
/// The first path is the seed the others were compared against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    paths: Vec<PathBuf>,
}

impl Cluster {
    pub(crate) fn new(paths: Vec<PathBuf>) -> Self {
        debug_assert!(!paths.is_empty());
        Self { paths }
    }

    /// The image every other member was matched against
    pub fn seed(&self) -> &Path {
        &self.paths[0]
    }

    /// Members in the order they joined
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

/// How clusters are formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupingMode {
    /// Compare against the seed only; order-dependent
    #[default]
    Star,
    /// Merge every chain of matches (union-find)
    Connected,
}

impl GroupingMode {
    /// The grouper implementing this mode
    pub fn grouper(&self) -> Box<dyn Grouper> {
        match self {
            GroupingMode::Star => Box::new(StarGrouper::new()),
            GroupingMode::Connected => Box::new(ConnectedGrouper::new()),
        }
    }
}

impl std::fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupingMode::Star => write!(f, "star"),
            GroupingMode::Connected => write!(f, "connected"),
        }
    }
}

/// Group hashed images with seed-based star clustering.
///
/// `hashed` must be in listing order; seeds are picked in that order.
pub fn group(hashed: &[HashedImage], threshold: u32) -> Vec<Cluster> {
    StarGrouper::new().group(hashed, &ThresholdStrategy::new(threshold))
}
