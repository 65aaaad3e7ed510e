//! Gain application and clipping detection
//!
//! Gains are computed in f64 and applied per sample, so a 0 dB gain leaves
//! every sample bit-identical and a full-scale sample stays exactly at 1.0.
//!
//! Clipping is exactly "magnitude above [`FULL_SCALE`]". No headroom margin
//! is added and nothing is ever attenuated here: deciding what to do about a
//! clipped signal belongs to the caller.
//!
//! Narrowing a gained sample back to f32 can round a value just over full
//! scale down to exactly 1.0. [`clips_with_gain`] judges the unrounded f64
//! product instead, so any positive gain on a full-scale sample clips.

use cal_core::FULL_SCALE;

/// Convert decibels to a linear scale factor: `10^(dB/20)`
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0f64.powf(db / 20.0)
}

/// Convert a linear scale factor to decibels
///
/// Returns negative infinity for silence.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        f64::NEG_INFINITY
    }
}

/// Multiply every sample by the linear equivalent of `gain_db` (in-place)
pub fn apply_gain(samples: &mut [f32], gain_db: f64) {
    let factor = db_to_linear(gain_db);

    // Unity gain must not touch the samples
    if factor == 1.0 {
        return;
    }

    for sample in samples.iter_mut() {
        *sample = (f64::from(*sample) * factor) as f32;
    }
}

/// Largest absolute sample value
///
/// Any non-finite sample makes the peak infinite.
pub fn peak_level(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |max, &s| {
        if s.is_finite() {
            max.max(s.abs())
        } else {
            f32::INFINITY
        }
    })
}

#[inline]
fn sample_clips(sample: f32) -> bool {
    // NaN compares false against everything, so test finiteness explicitly
    !sample.is_finite() || sample.abs() > FULL_SCALE
}

/// Whether any sample exceeds full scale (or is not a finite number)
pub fn is_clipping(samples: &[f32]) -> bool {
    samples.iter().any(|&s| sample_clips(s))
}

/// Whether scaling `samples` by `gain_db` would exceed full scale
///
/// Evaluated on the f64 product before any narrowing. A sample already at
/// full scale clips under any positive gain, including gains too small for
/// [`db_to_linear`] to move off 1.0. A non-finite gain always clips.
pub fn clips_with_gain(samples: &[f32], gain_db: f64) -> bool {
    if !gain_db.is_finite() {
        return true;
    }

    let factor = db_to_linear(gain_db);
    let full_scale = f64::from(FULL_SCALE);
    samples.iter().any(|&s| {
        let magnitude = f64::from(s).abs();
        !s.is_finite()
            || magnitude * factor > full_scale
            || (gain_db > 0.0 && magnitude >= full_scale)
    })
}

/// Number of samples that exceed full scale
pub fn clipped_samples(samples: &[f32]) -> usize {
    samples.iter().filter(|&&s| sample_clips(s)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversions() {
        assert_eq!(db_to_linear(0.0), 1.0);
        assert!((db_to_linear(20.0) - 10.0).abs() < 1e-12);
        assert!((db_to_linear(-6.0) - 0.501_187).abs() < 1e-6);
        assert!((linear_to_db(0.1) + 20.0).abs() < 1e-12);
        assert_eq!(linear_to_db(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn zero_db_leaves_samples_untouched() {
        let mut samples = vec![1.0, -1.0, 0.123_456_7];
        let original = samples.clone();
        apply_gain(&mut samples, 0.0);
        assert_eq!(samples, original);
        assert!(!is_clipping(&samples));
    }

    #[test]
    fn positive_gain_on_full_scale_clips() {
        let mut samples = vec![1.0, 0.0];
        apply_gain(&mut samples, 0.5);
        assert!(samples[0] > 1.0);
        assert!(is_clipping(&samples));
        assert_eq!(clipped_samples(&samples), 1);
    }

    #[test]
    fn negative_full_scale_counts_too() {
        let mut samples = vec![-1.0];
        apply_gain(&mut samples, 1.0);
        assert!(is_clipping(&samples));
    }

    #[test]
    fn attenuation_scales_linearly() {
        let mut samples = vec![0.5, -0.5];
        apply_gain(&mut samples, -20.0);
        assert!((samples[0] - 0.05).abs() < 1e-7);
        assert!((samples[1] + 0.05).abs() < 1e-7);
    }

    #[test]
    fn exactly_full_scale_is_not_clipping() {
        assert!(!is_clipping(&[1.0, -1.0, 0.0]));
        assert!(is_clipping(&[1.000_001]));
    }

    #[test]
    fn non_finite_samples_count_as_clipping() {
        assert!(is_clipping(&[0.0, f32::NAN]));
        assert!(is_clipping(&[f32::INFINITY]));
    }

    #[test]
    fn peak_of_mixed_signs() {
        assert_eq!(peak_level(&[0.2, -0.9, 0.5]), 0.9);
        assert_eq!(peak_level(&[]), 0.0);
    }

    #[test]
    fn peak_is_infinite_with_non_finite_samples() {
        assert_eq!(peak_level(&[0.2, f32::NAN, 0.5]), f32::INFINITY);
        assert_eq!(peak_level(&[f32::NEG_INFINITY]), f32::INFINITY);
    }

    #[test]
    fn tiny_positive_gain_on_full_scale_clips() {
        for gain_db in [1e-7, 1e-9, 1e-14, f64::MIN_POSITIVE] {
            // The narrowed sample is still exactly 1.0 ...
            let mut samples = vec![1.0f32];
            apply_gain(&mut samples, gain_db);
            assert_eq!(samples[0], 1.0);
            // ... but the gain still pushes it over
            assert!(clips_with_gain(&[1.0], gain_db), "{} dB", gain_db);
            assert!(clips_with_gain(&[-1.0], gain_db), "{} dB", gain_db);
        }
    }

    #[test]
    fn clips_with_gain_boundaries() {
        assert!(!clips_with_gain(&[1.0, -1.0], 0.0));
        assert!(!clips_with_gain(&[1.0], -1e-9));
        assert!(!clips_with_gain(&[0.5], 6.0));
        assert!(clips_with_gain(&[0.5], 6.1));
        assert!(clips_with_gain(&[0.1], f64::NAN));
        assert!(clips_with_gain(&[0.0], f64::INFINITY));
        assert!(!clips_with_gain(&[], 10.0));
    }
}
