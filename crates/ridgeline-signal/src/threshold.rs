//! Adaptive excess-power threshold estimation.
//!
//! The baseline is the *sum* of squared magnitudes over the unmasked,
//! floor-clipped bins of one slice — not the average. Callers multiply the
//! baseline by a configured multiplier directly, so the multiplier absorbs
//! both the significance level and the 1/N normalization. Keeping the sum
//! convention means existing channel configurations keep their meaning.

use ridgeline_core::PowerSample;

use crate::bin_mask::MaskedView;

/// A slice's baseline power and the derived excess-power threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// Σ |sample|² over the unmasked bins at or after the bin floor.
    pub baseline: f64,
    /// `multiplier * baseline`; bins must exceed this power to count as peaks.
    pub value: f64,
}

/// Estimates the threshold for one slice.
///
/// Pure function of the view, the bin floor, and the multiplier. A view
/// with no bins at or after `first_bin_to_use` yields a zero baseline and
/// therefore a zero threshold; the matching peak scan covers the same empty
/// range, so no spurious peaks result.
pub fn estimate_threshold<S: PowerSample>(
    view: &MaskedView<'_, S>,
    first_bin_to_use: usize,
    multiplier: f64,
) -> Threshold {
    let baseline: f64 = view
        .iter_from_bin(first_bin_to_use)
        .map(|(_, sample)| sample.power())
        .sum();
    Threshold {
        baseline,
        value: multiplier * baseline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bin_mask::BinMask;

    #[test]
    fn test_baseline_is_a_sum_not_an_average() {
        // Magnitudes [1,1,1,1,1,1,1,9]: power 1 everywhere except bin 7 = 81.
        let samples = [1.0_f64, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 9.0];
        let mask = BinMask::new(8, &[]).unwrap();
        let view = mask.view(&samples).unwrap();

        let threshold = estimate_threshold(&view, 0, 2.0);
        assert!((threshold.baseline - 88.0).abs() < 1e-12);
        assert!((threshold.value - 176.0).abs() < 1e-12);
    }

    #[test]
    fn test_bin_floor_clips_baseline() {
        let samples = [100.0_f64, 2.0, 2.0];
        let mask = BinMask::new(3, &[]).unwrap();
        let view = mask.view(&samples).unwrap();

        // Bin 0 carries almost all the power; the floor removes it.
        let threshold = estimate_threshold(&view, 1, 1.0);
        assert!((threshold.baseline - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_masked_bins_do_not_contribute() {
        let samples = [5.0_f64, 1.0, 1.0, 5.0];
        let mask = BinMask::new(4, &[0, 3]).unwrap();
        let view = mask.view(&samples).unwrap();

        let threshold = estimate_threshold(&view, 0, 10.0);
        assert!((threshold.baseline - 2.0).abs() < 1e-12);
        assert!((threshold.value - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_range_gives_zero_threshold() {
        let samples = [3.0_f64, 3.0];
        let mask = BinMask::new(2, &[]).unwrap();
        let view = mask.view(&samples).unwrap();

        let threshold = estimate_threshold(&view, 2, 10.0);
        assert_eq!(threshold.baseline, 0.0);
        assert_eq!(threshold.value, 0.0);
    }

    #[test]
    fn test_complex_samples_use_norm_sqr() {
        use num_complex::Complex64;

        let samples = [Complex64::new(3.0, 4.0), Complex64::new(0.0, 2.0)];
        let mask = BinMask::new(2, &[]).unwrap();
        let view = mask.view(&samples).unwrap();

        let threshold = estimate_threshold(&view, 0, 1.0);
        assert!((threshold.baseline - 29.0).abs() < 1e-12);
    }
}
