//! One-second attention binning.
//!
//! Raw sample density is uneven: dense along curve segments, sparse at
//! flat stretches. Resampling into fixed one-second buckets gives the
//! clip detector a uniform, monotonically indexed timeline.

use heatclip_models::{BinnedPoint, Sample};

/// Neutral value for a leading bin with no samples and no prior context.
const NEUTRAL_ATTENTION: f64 = 50.0;

/// Resample attention samples into exactly `duration` one-second bins.
///
/// Each bin holds the arithmetic mean of the samples falling inside
/// `[s, s+1)`; empty bins forward-fill the previous bin's value. Input
/// order does not matter; samples outside `[0, duration)` are ignored.
pub fn bin_samples(samples: &[Sample], duration: u32) -> Vec<BinnedPoint> {
    let mut sums = vec![(0.0_f64, 0_u32); duration as usize];

    for sample in samples {
        if sample.time < 0.0 {
            continue;
        }
        let second = sample.time.floor() as u64;
        if second >= duration as u64 {
            continue;
        }
        let slot = &mut sums[second as usize];
        slot.0 += sample.attention;
        slot.1 += 1;
    }

    let mut bins = Vec::with_capacity(duration as usize);
    let mut previous = NEUTRAL_ATTENTION;

    for (second, (sum, count)) in sums.into_iter().enumerate() {
        let attention = if count > 0 {
            sum / count as f64
        } else {
            previous
        };
        previous = attention;
        bins.push(BinnedPoint::new(second as u32, attention));
    }

    bins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_length_and_consecutive_seconds() {
        let samples = vec![Sample::new(0.5, 40.0), Sample::new(3.2, 80.0)];
        for duration in [1_u32, 5, 60, 600] {
            let bins = bin_samples(&samples, duration);
            assert_eq!(bins.len(), duration as usize);
            for (i, bin) in bins.iter().enumerate() {
                assert_eq!(bin.second, i as u32);
            }
        }
    }

    #[test]
    fn test_mean_within_bucket() {
        let samples = vec![
            Sample::new(2.1, 30.0),
            Sample::new(2.5, 60.0),
            Sample::new(2.9, 90.0),
        ];
        let bins = bin_samples(&samples, 4);
        assert!((bins[2].attention - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_forward_fill() {
        let samples = vec![Sample::new(1.0, 70.0)];
        let bins = bin_samples(&samples, 5);
        // First bin has no prior context: neutral default.
        assert!((bins[0].attention - 50.0).abs() < 1e-9);
        assert!((bins[1].attention - 70.0).abs() < 1e-9);
        // Empty bins carry the last value forward.
        assert!((bins[2].attention - 70.0).abs() < 1e-9);
        assert!((bins[4].attention - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_empty_input() {
        let bins = bin_samples(&[], 3);
        assert_eq!(bins.len(), 3);
        for bin in &bins {
            assert!((bin.attention - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unordered_input() {
        let samples = vec![Sample::new(3.5, 90.0), Sample::new(0.5, 10.0)];
        let bins = bin_samples(&samples, 5);
        assert!((bins[0].attention - 10.0).abs() < 1e-9);
        assert!((bins[3].attention - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_samples_ignored() {
        let samples = vec![
            Sample::new(-1.0, 99.0),
            Sample::new(10.0, 99.0),
            Sample::new(0.0, 20.0),
        ];
        let bins = bin_samples(&samples, 2);
        assert!((bins[0].attention - 20.0).abs() < 1e-9);
        assert!((bins[1].attention - 20.0).abs() < 1e-9);
    }
}
