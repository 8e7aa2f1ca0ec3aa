//! Pipeline execution implementation.

use crate::core::comparator::{Cluster, GroupingMode, ThresholdStrategy};
use crate::core::hasher::{
    hash_path, HashAlgorithm, HashOutcome, HashedImage, HashingMode, PerceptualHasher,
};
use crate::core::metadata::{enrich, ImageMetadata};
use crate::core::scanner::{ImageLister, ScanConfig, WalkDirLister};
use crate::error::{DupeFinderError, PipelineError};
use crate::events::{
    null_sender, Event, EventSender, GroupEvent, HashEvent, HashProgress, PipelineEvent,
    PipelinePhase, PipelineSummary,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Grouped output of a run, in the shape handed to collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Clusters of two or more images, each sorted largest file first
    pub clusters: Vec<Vec<ImageMetadata>>,
    /// Every listed image, including ones that failed to decode
    pub total_images: usize,
}

impl ScanReport {
    /// Rewrite record paths relative to `root`.
    ///
    /// Paths outside `root` are left untouched.
    pub fn relative_to(mut self, root: &Path) -> Self {
        for record in self.clusters.iter_mut().flatten() {
            if let Ok(relative) = record.path.strip_prefix(root) {
                record.path = relative.to_path_buf();
            }
        }
        self
    }
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Clusters with per-image metadata, largest file first
    pub clusters: Vec<Vec<ImageMetadata>>,
    /// Images returned by the lister
    pub total_images: usize,
    /// Images that produced a fingerprint
    pub hashed_images: usize,
    /// Images left out of clustering, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Unreadable directory entries (non-fatal)
    pub scan_errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Drop run statistics, keeping what collaborators consume
    pub fn into_report(self) -> ScanReport {
        ScanReport {
            clusters: self.clusters,
            total_images: self.total_images,
        }
    }
}

/// Cooperative cancellation flag shared with a running pipeline.
///
/// A cancelled run returns [`PipelineError::Cancelled`] and no clusters.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; in-flight file reads finish, nothing new starts
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum Hamming distance to a seed (lower = stricter)
    pub threshold: u32,
    /// Sequential or rayon-parallel hashing
    pub hashing: HashingMode,
    /// Worker count for parallel hashing (None = rayon's global pool)
    pub threads: Option<usize>,
    /// How clusters are formed
    pub grouping: GroupingMode,
    /// Lister configuration
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 10,
            hashing: HashingMode::Parallel,
            threads: None,
            grouping: GroupingMode::Star,
            scan_config: ScanConfig::default(),
        }
    }
}

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    hasher: Option<Box<dyn HashAlgorithm>>,
    cancellation: Option<CancellationToken>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the similarity threshold
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Choose sequential or parallel hashing
    pub fn hashing_mode(mut self, mode: HashingMode) -> Self {
        self.config.hashing = mode;
        self
    }

    /// Use a dedicated pool of `threads` workers for parallel hashing
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = Some(threads);
        self
    }

    /// Set the grouping mode
    pub fn grouping(mut self, grouping: GroupingMode) -> Self {
        self.config.grouping = grouping;
        self
    }

    /// Set lister configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Replace the fingerprint algorithm
    pub fn hasher(mut self, hasher: Box<dyn HashAlgorithm>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Attach a cancellation token
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            hasher: self
                .hasher
                .unwrap_or_else(|| Box::new(PerceptualHasher::new())),
            cancellation: self.cancellation.unwrap_or_default(),
        }
    }
}

/// The duplicate detection pipeline: list, hash, group, enrich
pub struct Pipeline {
    config: PipelineConfig,
    hasher: Box<dyn HashAlgorithm>,
    cancellation: CancellationToken,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self, root: &Path) -> Result<PipelineResult, DupeFinderError> {
        self.run_with_events(root, &null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<PipelineResult, DupeFinderError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Listing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Listing,
        }));

        let lister = WalkDirLister::new(self.config.scan_config.clone());
        let scan_result = lister.list_with_events(root, events);
        let scan_errors: Vec<String> = scan_result.errors.iter().map(|e| e.to_string()).collect();
        let images = scan_result.images;
        let total_images = images.len();
        self.check_cancelled(events)?;

        // Phase 2: Hashing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Hashing,
        }));

        let outcomes = self.hash_images(&images, events)?;
        self.check_cancelled(events)?;

        let mut hashed: Vec<HashedImage> = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                HashOutcome::Hashed(image) => hashed.push(image),
                HashOutcome::Skipped { path, reason } => skipped.push((path, reason)),
            }
        }

        events.send(Event::Hash(HashEvent::Completed {
            hashed: hashed.len(),
            skipped: skipped.len(),
        }));

        // Phase 3: Grouping, always one sequential pass in listing order
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));
        events.send(Event::Group(GroupEvent::Started {
            total_images: hashed.len(),
            threshold: self.config.threshold,
        }));

        let strategy = ThresholdStrategy::new(self.config.threshold);
        let clusters: Vec<Cluster> = self
            .config
            .grouping
            .grouper()
            .group_with_events(&hashed, &strategy, events);

        events.send(Event::Group(GroupEvent::Completed {
            total_clusters: clusters.len(),
        }));
        debug!(
            clusters = clusters.len(),
            threshold = self.config.threshold,
            mode = %self.config.grouping,
            "grouping finished"
        );
        self.check_cancelled(events)?;

        // Phase 4: Enriching
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Enriching,
        }));

        let clusters = clusters
            .iter()
            .map(enrich)
            .collect::<Result<Vec<_>, _>>()?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        let summary = PipelineSummary {
            total_images,
            hashed_images: hashed.len(),
            clusters: clusters.len(),
            clustered_images: clusters.iter().map(Vec::len).sum(),
            duration_ms,
        };

        info!(
            root = %root.display(),
            total_images,
            hashed = summary.hashed_images,
            skipped = skipped.len(),
            clusters = summary.clusters,
            duration_ms,
            "scan complete"
        );
        events.send(Event::Pipeline(PipelineEvent::Completed { summary }));

        Ok(PipelineResult {
            clusters,
            total_images,
            hashed_images: hashed.len(),
            skipped,
            scan_errors,
            duration_ms,
        })
    }

    /// Hash every image, keeping listing order whatever the hashing mode.
    fn hash_images(
        &self,
        images: &[PathBuf],
        events: &EventSender,
    ) -> Result<Vec<HashOutcome>, DupeFinderError> {
        let total = images.len();
        events.send(Event::Hash(HashEvent::Started {
            total_images: total,
        }));

        let completed = AtomicUsize::new(0);
        let hash_one = |path: &PathBuf| -> Option<HashOutcome> {
            if self.cancellation.is_cancelled() {
                return None;
            }

            let outcome = hash_path(self.hasher.as_ref(), path);
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

            if let HashOutcome::Skipped { path, reason } = &outcome {
                events.send(Event::Hash(HashEvent::Skipped {
                    path: path.clone(),
                    reason: reason.clone(),
                }));
            }
            events.send(Event::Hash(HashEvent::Progress(HashProgress {
                completed: done,
                total,
                current_path: path.clone(),
            })));

            Some(outcome)
        };

        let outcomes: Vec<Option<HashOutcome>> = match (self.config.hashing, self.config.threads) {
            (HashingMode::Sequential, _) => images.iter().map(&hash_one).collect(),
            (HashingMode::Parallel, None) => images.par_iter().map(&hash_one).collect(),
            (HashingMode::Parallel, Some(threads)) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;
                pool.install(|| images.par_iter().map(&hash_one).collect())
            }
        };

        // A missing outcome means the run was cancelled mid-stage
        outcomes
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.cancelled(events))
    }

    fn check_cancelled(&self, events: &EventSender) -> Result<(), DupeFinderError> {
        if self.cancellation.is_cancelled() {
            return Err(self.cancelled(events));
        }
        Ok(())
    }

    fn cancelled(&self, events: &EventSender) -> DupeFinderError {
        info!("scan cancelled");
        events.send(Event::Pipeline(PipelineEvent::Cancelled));
        PipelineError::Cancelled.into()
    }
}

/// Run the full pipeline on `folder_path` with default settings.
///
/// This is the entry point for collaborators: list, hash, group and
/// enrich, returning every cluster plus the number of images listed.
pub fn run_pipeline(
    folder_path: impl AsRef<Path>,
    threshold: u32,
) -> Result<ScanReport, DupeFinderError> {
    Pipeline::builder()
        .threshold(threshold)
        .build()
        .run(folder_path.as_ref())
        .map(PipelineResult::into_report)
}
