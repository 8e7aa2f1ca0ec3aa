//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the duplicate finder pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Listing phase events
    Scan(ScanEvent),
    /// Hashing phase events
    Hash(HashEvent),
    /// Grouping phase events
    Group(GroupEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the listing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Listing has started
    Started { root: PathBuf },
    /// A candidate image was found
    ImageFound { path: PathBuf },
    /// An entry could not be read but listing continues
    Error { path: PathBuf, message: String },
    /// Listing completed
    Completed { total_images: usize },
}

/// Events during the hashing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Hashing has started
    Started { total_images: usize },
    /// Progress update during hashing
    Progress(HashProgress),
    /// An image could not be decoded and was left out
    Skipped { path: PathBuf, reason: String },
    /// Hashing completed
    Completed { hashed: usize, skipped: usize },
}

/// Progress information during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of images processed so far (hashed or skipped)
    pub completed: usize,
    /// Total number of images to process
    pub total: usize,
    /// Image that was just processed
    pub current_path: PathBuf,
}

/// Events during the grouping phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroupEvent {
    /// Grouping has started
    Started { total_images: usize, threshold: u32 },
    /// A cluster with two or more members was formed
    ClusterFound { seed: PathBuf, size: usize },
    /// Grouping completed
    Completed { total_clusters: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled,
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Listing,
    Hashing,
    Grouping,
    Enriching,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Total images listed, including ones that failed to decode
    pub total_images: usize,
    /// Images that produced a fingerprint
    pub hashed_images: usize,
    /// Number of clusters found
    pub clusters: usize,
    /// Images that ended up in some cluster
    pub clustered_images: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Listing => write!(f, "Listing"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
            PipelinePhase::Enriching => write!(f, "Reading metadata"),
        }
    }
}
