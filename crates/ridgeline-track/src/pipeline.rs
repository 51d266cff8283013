//! Per-channel processing session.
//!
//! A [`ChannelPipeline`] owns one channel's bin mask and track pool and
//! wires the per-slice stages together: mask → threshold → peak scan →
//! track matching. Channels are independent; running several in parallel
//! means one pipeline each, with no shared state between them.

use thiserror::Error;

use ridgeline_core::{PowerSample, Resettable, SliceTap, SpectrumSlice, Validate};
use ridgeline_signal::{detect_peaks, estimate_threshold, BinMask, MaskError, MaskedView};

use crate::builder::TrackBuilder;
use crate::config::TrackerConfig;
use crate::track::{Candidate, Track, TrackId};

/// A specialized `Result` type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors from channel pipeline construction and slice processing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration rejected at start-of-run
    #[error(transparent)]
    Config(#[from] ridgeline_core::CoreError),

    /// Mask construction or application failed
    #[error("Mask error: {0}")]
    Mask(#[from] MaskError),

    /// The caller violated the non-decreasing slice-index contract.
    ///
    /// The offending slice is rejected and the track pool is untouched;
    /// clustering against out-of-order input would silently corrupt the
    /// same-slice/next-slice matching rules.
    #[error("Out-of-order slice index {got}: previous slice was {last}")]
    OutOfOrderSlice {
        /// The most recent accepted slice index
        last: u64,
        /// The rejected slice index
        got: u64,
    },
}

/// What one slice did to the channel's track pool.
#[derive(Debug, Default, Clone)]
pub struct SliceReport {
    /// Stream index of the processed slice.
    pub slice_index: u64,
    /// Σ |sample|² over the scanned bins.
    pub baseline_power: f64,
    /// The excess-power threshold applied to the scan.
    pub threshold: f64,
    /// Ascending external bin indices that exceeded the threshold.
    pub peak_bins: Vec<usize>,
    /// Tracks that gained at least one member.
    pub extended: Vec<TrackId>,
    /// New tracks born from unmatched peaks.
    pub born: Vec<TrackId>,
    /// Tracks removed as noise.
    pub pruned: Vec<TrackId>,
    /// Tracks that went dormant.
    pub dormant: Vec<TrackId>,
}

/// One channel's clustering session.
pub struct ChannelPipeline {
    config: TrackerConfig,
    mask: BinMask,
    builder: TrackBuilder,
    last_slice: Option<u64>,
    tap: Option<Box<dyn SliceTap>>,
    total_candidates: u64,
}

impl ChannelPipeline {
    /// Creates a pipeline from a configuration and the channel's mask.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: TrackerConfig, mask: BinMask) -> PipelineResult<Self> {
        config.validate()?;
        let builder = TrackBuilder::new(&config);
        Ok(Self {
            config,
            mask,
            builder,
            last_slice: None,
            tap: None,
            total_candidates: 0,
        })
    }

    /// Registers a debug tap fed the raw magnitudes of each slice.
    #[must_use]
    pub fn with_tap(mut self, tap: Box<dyn SliceTap>) -> Self {
        self.tap = Some(tap);
        self
    }

    /// Processes one slice of the channel's stream.
    ///
    /// Slice indices must be non-decreasing. A slice whose length differs
    /// from the channel mask is a recoverable condition: a warning is
    /// logged and a one-off mask with no exclusions (the rebuilt mask does
    /// not inherit the channel's exclusion set) is substituted for that
    /// call only.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::OutOfOrderSlice`] for a slice index below
    /// the previous one; the slice is rejected and no state changes.
    pub fn process_slice<S: PowerSample>(
        &mut self,
        slice: &SpectrumSlice<S>,
    ) -> PipelineResult<SliceReport> {
        if let Some(last) = self.last_slice {
            if slice.index() < last {
                return Err(PipelineError::OutOfOrderSlice {
                    last,
                    got: slice.index(),
                });
            }
        }
        self.last_slice = Some(slice.index());

        if let Some(tap) = self.tap.as_mut() {
            let magnitudes = slice.magnitudes();
            tap.on_slice(slice.index(), &magnitudes);
        }

        let samples = slice.samples();
        match self.mask.view(samples) {
            Ok(view) => Ok(Self::scan(&self.config, &mut self.builder, slice.index(), &view)),
            Err(MaskError::LengthMismatch { expected, actual }) => {
                tracing::warn!(
                    slice = slice.index(),
                    expected,
                    actual,
                    "spectrum length does not match the channel mask; substituting a one-off mask"
                );
                let fallback = BinMask::new(samples.len(), &[])?;
                let view = fallback.view(samples)?;
                Ok(Self::scan(&self.config, &mut self.builder, slice.index(), &view))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn scan<S: PowerSample>(
        config: &TrackerConfig,
        builder: &mut TrackBuilder,
        slice_index: u64,
        view: &MaskedView<'_, S>,
    ) -> SliceReport {
        let first_bin = config.first_bin_to_use;
        let threshold = estimate_threshold(view, first_bin, config.threshold_multiplier);
        let peak_bins = detect_peaks(view, first_bin, threshold);
        let outcome = builder.observe_peaks(slice_index, &peak_bins);

        SliceReport {
            slice_index,
            baseline_power: threshold.baseline,
            threshold: threshold.value,
            peak_bins,
            extended: outcome.extended,
            born: outcome.born,
            pruned: outcome.pruned,
            dormant: outcome.dormant,
        }
    }

    /// Closes the stream and hands every qualifying track to the caller.
    ///
    /// The pipeline is left ready for a fresh run: the pool is empty and
    /// the next slice may carry any index.
    pub fn finalize(&mut self) -> Vec<Candidate> {
        let candidates = self.builder.finalize();
        self.total_candidates += candidates.len() as u64;
        self.last_slice = None;
        tracing::info!(
            candidates = candidates.len(),
            total = self.total_candidates,
            "finalized channel stream"
        );
        candidates
    }

    /// Tracks currently open for matching, in creation order.
    pub fn open_tracks(&self) -> impl Iterator<Item = &Track> {
        self.builder.open_tracks()
    }

    /// Every surviving track, dormant included.
    pub fn all_tracks(&self) -> &[Track] {
        self.builder.all_tracks()
    }

    /// The channel's configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The channel's mask.
    pub fn mask(&self) -> &BinMask {
        &self.mask
    }

    /// Candidates emitted across every finalized run of this session.
    pub fn total_candidates(&self) -> u64 {
        self.total_candidates
    }
}

impl Resettable for ChannelPipeline {
    fn reset(&mut self) {
        self.builder.reset();
        self.last_slice = None;
        self.total_candidates = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(multiplier: f64, length: usize) -> ChannelPipeline {
        let config = TrackerConfig {
            threshold_multiplier: multiplier,
            ..TrackerConfig::default()
        };
        ChannelPipeline::new(config, BinMask::new(length, &[]).unwrap()).unwrap()
    }

    fn slice(index: u64, samples: &[f64]) -> SpectrumSlice<f64> {
        SpectrumSlice::new(index, samples.to_vec()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = TrackerConfig {
            threshold_multiplier: -1.0,
            ..TrackerConfig::default()
        };
        assert!(matches!(
            ChannelPipeline::new(config, BinMask::new(8, &[]).unwrap()),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_out_of_order_slice_rejected_without_state_change() {
        let mut p = pipeline(0.02, 8);
        p.process_slice(&slice(5, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 9.0]))
            .unwrap();
        assert_eq!(p.open_tracks().count(), 1);

        let err = p
            .process_slice(&slice(4, &[9.0; 8]))
            .expect_err("must reject");
        assert!(matches!(
            err,
            PipelineError::OutOfOrderSlice { last: 5, got: 4 }
        ));
        assert_eq!(p.open_tracks().count(), 1);

        // Equal indices are allowed (non-decreasing contract).
        p.process_slice(&slice(5, &[1.0; 8])).unwrap();
    }

    #[test]
    fn test_mismatched_slice_uses_one_off_mask() {
        // Mask excludes bin 3 for length 4; a length-5 slice must still be
        // processed, with no exclusions applied.
        let config = TrackerConfig {
            threshold_multiplier: 0.5,
            ..TrackerConfig::default()
        };
        let mask = BinMask::new(4, &[3]).unwrap();
        let mut p = ChannelPipeline::new(config, mask).unwrap();

        let report = p
            .process_slice(&slice(0, &[1.0, 1.0, 1.0, 9.0, 1.0]))
            .unwrap();
        // Bin 3 peaks: the one-off mask does not inherit the exclusion.
        assert_eq!(report.peak_bins, vec![3]);

        // Matching-length slices go back to the channel mask.
        let report = p.process_slice(&slice(1, &[1.0, 1.0, 1.0, 9.0])).unwrap();
        assert!(report.peak_bins.is_empty());
    }

    #[test]
    fn test_tap_sees_raw_magnitudes() {
        use std::sync::{Arc, Mutex};

        let seen: Arc<Mutex<Vec<(u64, Vec<f64>)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let tap = move |index: u64, magnitudes: &[f64]| {
            sink.lock().unwrap().push((index, magnitudes.to_vec()));
        };

        let mut p = pipeline(2.0, 3).with_tap(Box::new(tap));
        p.process_slice(&slice(0, &[3.0, 1.0, 2.0])).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, 0);
        assert_eq!(seen[0].1, vec![3.0, 1.0, 2.0]);
    }
}
