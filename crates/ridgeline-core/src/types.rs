//! Core data types for the ridgeline track builder.
//!
//! The central input type is [`SpectrumSlice`]: one timestamped
//! frequency-domain spectrum out of the stream a channel produces. Slices
//! are generic over their sample type through the [`PowerSample`]
//! capability, so a channel can carry raw complex FFT output or
//! pre-computed magnitudes without runtime dispatch.

use chrono::{DateTime, Utc};
use num_complex::{Complex32, Complex64};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Capability trait for spectrum sample types.
///
/// Resolved at compile time; implementors only need to expose a magnitude.
/// Power defaults to magnitude squared, which complex samples override with
/// `norm_sqr` to skip the square root.
pub trait PowerSample: Copy + Send + Sync + 'static {
    /// Magnitude (absolute value) of the sample.
    fn magnitude(&self) -> f64;

    /// Squared magnitude of the sample.
    fn power(&self) -> f64 {
        let m = self.magnitude();
        m * m
    }
}

impl PowerSample for f64 {
    fn magnitude(&self) -> f64 {
        self.abs()
    }
}

impl PowerSample for f32 {
    fn magnitude(&self) -> f64 {
        f64::from(self.abs())
    }
}

impl PowerSample for Complex64 {
    fn magnitude(&self) -> f64 {
        self.norm()
    }

    fn power(&self) -> f64 {
        self.norm_sqr()
    }
}

impl PowerSample for Complex32 {
    fn magnitude(&self) -> f64 {
        f64::from(self.norm())
    }

    fn power(&self) -> f64 {
        f64::from(self.norm_sqr())
    }
}

/// One frequency-domain spectrum in a channel's input stream.
///
/// The slice index is supplied by the caller and must be non-decreasing
/// across the stream; the core never generates indices itself. A slice is
/// immutable once constructed.
#[derive(Debug, Clone)]
pub struct SpectrumSlice<S> {
    index: u64,
    samples: Vec<S>,
    acquired_at: Option<DateTime<Utc>>,
}

impl<S: PowerSample> SpectrumSlice<S> {
    /// Creates a slice from its stream index and sample buffer.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty sample buffer; zero-length
    /// spectra carry no information and would make every downstream stage
    /// degenerate.
    pub fn new(index: u64, samples: Vec<S>) -> CoreResult<Self> {
        if samples.is_empty() {
            return Err(CoreError::validation(format!(
                "spectrum slice {index} has no samples"
            )));
        }
        Ok(Self {
            index,
            samples,
            acquired_at: None,
        })
    }

    /// Attaches an acquisition timestamp (instrument wall-clock metadata).
    #[must_use]
    pub fn with_acquired_at(mut self, at: DateTime<Utc>) -> Self {
        self.acquired_at = Some(at);
        self
    }

    /// Stream index of this slice.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Sample buffer.
    pub fn samples(&self) -> &[S] {
        &self.samples
    }

    /// Number of frequency bins.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` when the slice has no bins (unreachable via `new`).
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Acquisition timestamp, if the instrument supplied one.
    pub fn acquired_at(&self) -> Option<DateTime<Utc>> {
        self.acquired_at
    }

    /// Magnitudes of every bin, in bin order.
    ///
    /// Allocates; intended for debug taps and rendering collaborators, not
    /// the hot path.
    pub fn magnitudes(&self) -> Vec<f64> {
        self.samples.iter().map(PowerSample::magnitude).collect()
    }
}

/// One (slice index, bin index) member of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Stream index of the slice that produced the peak.
    pub slice: u64,
    /// External (pre-mask) frequency bin index of the peak.
    pub bin: usize,
}

impl TrackPoint {
    /// Convenience constructor.
    #[must_use]
    pub const fn new(slice: u64, bin: usize) -> Self {
        Self { slice, bin }
    }
}

impl std::fmt::Display for TrackPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.slice, self.bin)
    }
}
