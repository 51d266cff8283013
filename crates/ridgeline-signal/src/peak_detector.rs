//! Excess-power peak detection.
//!
//! Re-scans the same masked, floor-clipped view the threshold was estimated
//! from and returns every external bin index whose power strictly exceeds
//! the threshold. The mask's unmasked-bin list is ascending and duplicate
//! free, so the result has set semantics without any post-sorting.

use ridgeline_core::PowerSample;

use crate::bin_mask::MaskedView;
use crate::threshold::Threshold;

/// Scans one slice for bins whose power exceeds `threshold.value`.
///
/// Returns ascending, deduplicated external bin indices. An empty result is
/// an ordinary outcome (a quiet slice), not an error.
pub fn detect_peaks<S: PowerSample>(
    view: &MaskedView<'_, S>,
    first_bin_to_use: usize,
    threshold: Threshold,
) -> Vec<usize> {
    view.iter_from_bin(first_bin_to_use)
        .filter(|(_, sample)| sample.power() > threshold.value)
        .map(|(bin, _)| bin)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bin_mask::BinMask;
    use crate::threshold::estimate_threshold;

    fn peaks_for(samples: &[f64], excluded: &[usize], first_bin: usize, mult: f64) -> Vec<usize> {
        let mask = BinMask::new(samples.len(), excluded).unwrap();
        let view = mask.view(samples).unwrap();
        let threshold = estimate_threshold(&view, first_bin, mult);
        detect_peaks(&view, first_bin, threshold)
    }

    #[test]
    fn test_quiet_slice_has_no_peaks() {
        // baseline = 88, threshold = 176: nothing exceeds it.
        let samples = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 9.0];
        assert!(peaks_for(&samples, &[], 0, 2.0).is_empty());
    }

    #[test]
    fn test_single_peak_found() {
        // Same slice, multiplier 0.02: threshold = 1.76, only bin 7 (power 81)
        // exceeds it.
        let samples = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 9.0];
        assert_eq!(peaks_for(&samples, &[], 0, 0.02), vec![7]);
    }

    #[test]
    fn test_threshold_is_strict() {
        // Bin power exactly equal to the threshold is not a peak.
        let samples = [2.0_f64, 0.0];
        let mask = BinMask::new(2, &[]).unwrap();
        let view = mask.view(&samples).unwrap();
        let threshold = Threshold {
            baseline: 4.0,
            value: 4.0,
        };
        assert!(detect_peaks(&view, 0, threshold).is_empty());

        let below = Threshold {
            baseline: 4.0,
            value: 3.9999,
        };
        assert_eq!(detect_peaks(&view, 0, below), vec![0]);
    }

    #[test]
    fn test_peaks_ascending() {
        let samples = [9.0, 1.0, 9.0, 1.0, 9.0];
        let peaks = peaks_for(&samples, &[], 0, 0.1);
        assert_eq!(peaks, vec![0, 2, 4]);
    }

    #[test]
    fn test_masked_bin_never_peaks() {
        let samples = [1.0, 50.0, 1.0, 6.0];
        let peaks = peaks_for(&samples, &[1], 0, 0.5);
        // Bin 1 is cut: baseline = 1+1+36 = 38, threshold = 19, only bin 3 peaks.
        assert_eq!(peaks, vec![3]);
    }

    #[test]
    fn test_bin_floor_excludes_low_bins() {
        let samples = [50.0, 1.0, 7.0, 1.0];
        let peaks = peaks_for(&samples, &[], 1, 0.5);
        // Bins below the floor are invisible: baseline = 1+49+1 = 51,
        // threshold = 25.5, only bin 2 (power 49) exceeds it.
        assert_eq!(peaks, vec![2]);
    }
}
