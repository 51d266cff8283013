//! # ridgeline-track
//!
//! Incremental clustering of excess-power peak bins into time-frequency
//! tracks.
//!
//! This crate contains the stateful half of ridgeline:
//!
//! - **Track Pool**: [`Track`] members, lifecycle, and bounds; the
//!   [`TrackBuilder`] matching engine with its creation-order tie-break and
//!   mark-then-compact pruning.
//! - **Channel Session**: [`ChannelPipeline`] wires a channel's
//!   [`BinMask`](ridgeline_signal::BinMask), threshold estimation, and peak
//!   detection to the track pool, enforces the non-decreasing slice-index
//!   contract, and emits [`Candidate`]s at end-of-stream.
//!
//! # Example
//!
//! ```rust
//! use ridgeline_core::SpectrumSlice;
//! use ridgeline_signal::BinMask;
//! use ridgeline_track::{ChannelPipeline, TrackerConfig};
//!
//! let config = TrackerConfig {
//!     threshold_multiplier: 0.02,
//!     ..TrackerConfig::default()
//! };
//! let mask = BinMask::new(8, &[]).unwrap();
//! let mut pipeline = ChannelPipeline::new(config, mask).unwrap();
//!
//! let slice = SpectrumSlice::new(0, vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 9.0]).unwrap();
//! let report = pipeline.process_slice(&slice).unwrap();
//! assert_eq!(report.peak_bins, vec![7]);
//! assert_eq!(report.born.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
pub mod pipeline;
pub mod track;

// Re-export main types for convenience
pub use builder::{MatchOutcome, TrackBuilder};
pub use config::TrackerConfig;
pub use pipeline::{ChannelPipeline, PipelineError, PipelineResult, SliceReport};
pub use track::{Candidate, Track, TrackBounds, TrackId, TrackState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::{MatchOutcome, TrackBuilder};
    pub use crate::config::TrackerConfig;
    pub use crate::pipeline::{ChannelPipeline, PipelineError, PipelineResult, SliceReport};
    pub use crate::track::{Candidate, Track, TrackBounds, TrackId, TrackState};
}
