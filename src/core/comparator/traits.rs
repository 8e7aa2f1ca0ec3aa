//! Trait definitions for comparison strategies.

/// Strategy trait for deciding whether two fingerprints are similar
pub trait ComparisonStrategy: Send + Sync {
    /// Determine if two images should be grouped based on distance
    fn is_similar(&self, distance: u32) -> bool;

    /// Get the threshold used
    fn threshold(&self) -> u32;

    /// Human-readable description of the strategy
    fn description(&self) -> String;
}

/// Simple threshold-based comparison strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdStrategy {
    /// Maximum distance still considered similar
    threshold: u32,
}

impl ThresholdStrategy {
    /// Create a new threshold strategy.
    ///
    /// 0 matches only bit-identical fingerprints; 64 or more matches
    /// everything.
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn is_similar(&self, distance: u32) -> bool {
        distance <= self.threshold
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn description(&self) -> String {
        format!(
            "Threshold strategy: images with distance <= {} are grouped",
            self.threshold
        )
    }
}
