//! # Pipeline Module
//!
//! Orchestrates the full duplicate detection workflow.
//!
//! ## Pipeline Stages
//! 1. **List** - Find every supported image under the root folder
//! 2. **Hash** - Compute perceptual fingerprints, skipping undecodable files
//! 3. **Group** - Cluster similar fingerprints in listing order
//! 4. **Enrich** - Read size, dimensions and modified time for cluster members
//!
//! ## Parallelism
//! Hashing uses rayon, on the global pool or a dedicated one sized with
//! [`PipelineBuilder::threads`]. Grouping is always a single sequential pass.

mod executor;

pub use executor::{
    run_pipeline, CancellationToken, Pipeline, PipelineBuilder, PipelineConfig, PipelineResult,
    ScanReport,
};
