//! Clustering configuration.

use serde::{Deserialize, Serialize};

use ridgeline_core::{
    CoreError, CoreResult, Validate, DEFAULT_MINIMUM_GROUP_SIZE, DEFAULT_THRESHOLD_MULTIPLIER,
};

/// Configuration for one channel's track builder.
///
/// Margins are bin counts and deliberately unsigned: a negative frequency
/// tolerance is unrepresentable rather than merely rejected. Everything
/// else is validated once at start-of-run; the hot path never clamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Multiplier applied to a slice's summed power to form the
    /// excess-power threshold (default: 10.0)
    pub threshold_multiplier: f64,
    /// Tracks at or below this many members are pruned once stale
    /// (default: 2)
    pub minimum_group_size: usize,
    /// Frequency tolerance in bins when a peak arrives for the same slice
    /// as a track's last member (default: 1)
    pub margin_same_time: usize,
    /// Downward frequency tolerance in bins when a peak arrives one slice
    /// after a track's last member (default: 1)
    pub margin_low: usize,
    /// Upward frequency tolerance in bins for the one-slice-later case
    /// (default: 3)
    pub margin_high: usize,
    /// Bins below this index are invisible to threshold estimation and
    /// peak search, independent of the channel mask (default: 0)
    pub first_bin_to_use: usize,
    /// Minimum slice-index span a finished track must cover to be emitted
    /// as a candidate (default: 2)
    pub minimum_time_span: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            threshold_multiplier: DEFAULT_THRESHOLD_MULTIPLIER,
            minimum_group_size: DEFAULT_MINIMUM_GROUP_SIZE,
            margin_same_time: 1,
            margin_low: 1,
            margin_high: 3,
            first_bin_to_use: 0,
            minimum_time_span: 2,
        }
    }
}

impl Validate for TrackerConfig {
    fn validate(&self) -> CoreResult<()> {
        if !self.threshold_multiplier.is_finite() || self.threshold_multiplier <= 0.0 {
            return Err(CoreError::configuration(format!(
                "threshold multiplier must be positive and finite, got {}",
                self.threshold_multiplier
            )));
        }
        if self.minimum_group_size == 0 {
            return Err(CoreError::configuration(
                "minimum group size must be at least 1",
            ));
        }
        Ok(())
    }
}
