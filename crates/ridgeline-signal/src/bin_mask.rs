//! Per-channel bin exclusion mask.
//!
//! A [`BinMask`] records which frequency bins of a fixed-length spectrum are
//! excluded from threshold estimation and peak search (permanently noisy
//! lines, the DC bin, instrument artifacts). The mask is built once per
//! channel and reused for every slice of that length; it owns no sample
//! data. Applying it to a slice yields a borrowed [`MaskedView`] with zero
//! allocation.
//!
//! Excluded regions can be given as individual bins or as contiguous index
//! ranges, matching how cut regions arrive from channel configuration.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use ridgeline_core::PowerSample;

/// Errors from mask construction and application.
#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    /// A mask over zero bins is meaningless
    #[error("Spectrum length must be > 0")]
    ZeroLength,

    /// An excluded bin index fell outside the spectrum
    #[error("Excluded bin {bin} out of range for spectrum length {length}")]
    ExcludedBinOutOfRange {
        /// The offending bin index
        bin: usize,
        /// The mask's spectrum length
        length: usize,
    },

    /// An incoming slice did not match the mask's recorded length.
    ///
    /// Recoverable: callers substitute a one-off mask for that slice and
    /// keep processing.
    #[error("Spectrum length {actual} does not match mask length {expected}")]
    LengthMismatch {
        /// The mask's recorded spectrum length
        expected: usize,
        /// The incoming slice's length
        actual: usize,
    },
}

/// Exclusion set over the bin indices of a fixed-length spectrum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinMask {
    spectrum_length: usize,
    excluded: Vec<bool>,
    /// Ascending external indices of every unmasked bin.
    positions: Vec<usize>,
}

impl BinMask {
    /// Builds a mask over `spectrum_length` bins with the given bins excluded.
    ///
    /// Duplicate excluded indices are tolerated (set semantics).
    ///
    /// # Errors
    ///
    /// Rejects a zero spectrum length and any excluded index at or beyond
    /// the spectrum length.
    pub fn new(spectrum_length: usize, excluded_bins: &[usize]) -> Result<Self, MaskError> {
        if spectrum_length == 0 {
            return Err(MaskError::ZeroLength);
        }
        let mut excluded = vec![false; spectrum_length];
        for &bin in excluded_bins {
            if bin >= spectrum_length {
                return Err(MaskError::ExcludedBinOutOfRange {
                    bin,
                    length: spectrum_length,
                });
            }
            excluded[bin] = true;
        }
        Ok(Self::from_flags(spectrum_length, excluded))
    }

    /// Builds a mask from contiguous excluded index ranges (end-exclusive).
    ///
    /// # Errors
    ///
    /// Rejects a zero spectrum length and any range extending beyond it.
    pub fn with_excluded_ranges(
        spectrum_length: usize,
        ranges: &[Range<usize>],
    ) -> Result<Self, MaskError> {
        if spectrum_length == 0 {
            return Err(MaskError::ZeroLength);
        }
        let mut excluded = vec![false; spectrum_length];
        for range in ranges {
            if range.end > spectrum_length {
                return Err(MaskError::ExcludedBinOutOfRange {
                    bin: range.end - 1,
                    length: spectrum_length,
                });
            }
            for bin in range.clone() {
                excluded[bin] = true;
            }
        }
        Ok(Self::from_flags(spectrum_length, excluded))
    }

    fn from_flags(spectrum_length: usize, excluded: Vec<bool>) -> Self {
        let positions = excluded
            .iter()
            .enumerate()
            .filter(|(_, &cut)| !cut)
            .map(|(bin, _)| bin)
            .collect();
        Self {
            spectrum_length,
            excluded,
            positions,
        }
    }

    /// The spectrum length this mask was built for.
    pub fn spectrum_length(&self) -> usize {
        self.spectrum_length
    }

    /// Number of unmasked bins.
    pub fn unmasked_len(&self) -> usize {
        self.positions.len()
    }

    /// `true` if the external bin index is excluded.
    ///
    /// Out-of-range indices count as excluded.
    pub fn is_excluded(&self, bin: usize) -> bool {
        self.excluded.get(bin).copied().unwrap_or(true)
    }

    /// Ascending external indices of the unmasked bins.
    pub fn unmasked_bins(&self) -> &[usize] {
        &self.positions
    }

    /// Internal position of the nearest unmasked bin at or after `bin`.
    ///
    /// Returns an index into [`unmasked_bins`](Self::unmasked_bins), or
    /// `None` when every unmasked bin lies below `bin`. This is the lookup
    /// that makes a `first_bin_to_use` floor cheap: scanning starts at the
    /// returned position instead of filtering the whole range per call.
    pub fn position_at_or_after(&self, bin: usize) -> Option<usize> {
        let pos = self.positions.partition_point(|&b| b < bin);
        (pos < self.positions.len()).then_some(pos)
    }

    /// Binds the mask to one slice's sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::LengthMismatch`] when the buffer length differs
    /// from the mask's recorded length; the caller decides whether to treat
    /// that as fatal or to substitute a one-off mask.
    pub fn view<'a, S: PowerSample>(
        &'a self,
        samples: &'a [S],
    ) -> Result<MaskedView<'a, S>, MaskError> {
        if samples.len() != self.spectrum_length {
            return Err(MaskError::LengthMismatch {
                expected: self.spectrum_length,
                actual: samples.len(),
            });
        }
        Ok(MaskedView {
            mask: self,
            samples,
        })
    }
}

/// A mask bound to one slice's sample buffer.
///
/// Borrowed from both the mask and the samples; constructing one allocates
/// nothing.
#[derive(Debug, Clone, Copy)]
pub struct MaskedView<'a, S> {
    mask: &'a BinMask,
    samples: &'a [S],
}

impl<'a, S: PowerSample> MaskedView<'a, S> {
    /// The mask this view was produced by.
    pub fn mask(&self) -> &'a BinMask {
        self.mask
    }

    /// Number of unmasked bins in the view.
    pub fn len(&self) -> usize {
        self.mask.unmasked_len()
    }

    /// `true` when the mask excludes every bin.
    pub fn is_empty(&self) -> bool {
        self.mask.unmasked_len() == 0
    }

    /// Iterates `(external bin index, sample)` over the unmasked bins at or
    /// after `first_bin`, in ascending bin order.
    pub fn iter_from_bin(&self, first_bin: usize) -> impl Iterator<Item = (usize, S)> + 'a {
        let start = self
            .mask
            .position_at_or_after(first_bin)
            .unwrap_or(self.mask.unmasked_len());
        let samples = self.samples;
        self.mask.positions[start..]
            .iter()
            .map(move |&bin| (bin, samples[bin]))
    }
}
