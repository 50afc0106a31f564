//! Exact-length linear resampling.
//!
//! Stretches or compresses a sample sequence to a requested number of
//! samples. This is a time-stretch (pitch follows the ratio), not a
//! band-limited sample-rate conversion: the output length is guaranteed,
//! fidelity under large ratios is not.

/// Resample `input` to exactly `target_len` samples.
///
/// The first and last input samples map onto the first and last output
/// samples; everything in between is linearly interpolated, rounded to the
/// nearest integer and clamped to the `i16` range.
///
/// Degenerate inputs:
/// - `target_len == 0` gives an empty vector
/// - a single input sample is repeated `target_len` times
/// - an empty input gives `target_len` samples of silence
pub fn resample(input: &[i16], target_len: usize) -> Vec<i16> {
    if target_len == 0 {
        return Vec::new();
    }

    match input.len() {
        0 => return vec![0; target_len],
        1 => return vec![input[0]; target_len],
        _ => {}
    }

    if target_len == 1 {
        return vec![input[0]];
    }

    let ratio = (input.len() - 1) as f64 / (target_len - 1) as f64;
    let last = input.len() - 1;

    (0..target_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let base = (pos.floor() as usize).min(last);
            let frac = pos - base as f64;

            if base + 1 > last {
                return input[base];
            }

            let a = input[base] as f64;
            let b = input[base + 1] as f64;
            clamp_to_i16((a + (b - a) * frac).round())
        })
        .collect()
}

/// Saturating conversion; never wraps.
fn clamp_to_i16(value: f64) -> i16 {
    value.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<i16> {
        (0..len).map(|i| ((i * 37) % 4001) as i16 - 2000).collect()
    }

    #[test]
    fn output_has_exact_length() {
        let input = ramp(1000);
        for target in [0, 1, 2, 3, 999, 1000, 1001, 4321, 20_000] {
            assert_eq!(resample(&input, target).len(), target, "target {}", target);
        }
    }

    #[test]
    fn zero_target_is_empty() {
        assert!(resample(&ramp(10), 0).is_empty());
        assert!(resample(&[], 0).is_empty());
    }

    #[test]
    fn single_sample_is_repeated() {
        assert_eq!(resample(&[-42], 5), vec![-42; 5]);
        assert_eq!(resample(&[7], 1), vec![7]);
    }

    #[test]
    fn empty_input_yields_silence() {
        assert_eq!(resample(&[], 4), vec![0; 4]);
    }

    #[test]
    fn same_length_is_identity() {
        let input = ramp(777);
        assert_eq!(resample(&input, input.len()), input);
    }

    #[test]
    fn boundaries_are_preserved() {
        let input = ramp(513);
        for target in [2, 3, 100, 512, 514, 5000] {
            let out = resample(&input, target);
            assert_eq!(out[0], input[0]);
            assert_eq!(out[target - 1], input[input.len() - 1]);
        }
    }

    #[test]
    fn stretch_interpolates_midpoints() {
        // 3 samples -> 5: ratio 0.5, odd outputs are midpoints
        assert_eq!(resample(&[0, 100, -100], 5), vec![0, 50, 100, 0, -100]);
    }

    #[test]
    fn interpolation_rounds_to_nearest() {
        // ratio 1/3: 10/3 = 3.33 -> 3, 20/3 = 6.67 -> 7
        assert_eq!(resample(&[0, 10], 4), vec![0, 3, 7, 10]);
    }

    #[test]
    fn compress_picks_scaled_positions() {
        let input: Vec<i16> = (0..9).map(|i| i * 10).collect();
        assert_eq!(resample(&input, 3), vec![0, 40, 80]);
    }

    #[test]
    fn extremes_are_clamped_not_wrapped() {
        let out = resample(&[i16::MAX, i16::MAX, i16::MIN, i16::MIN], 7);
        assert!(out.iter().all(|s| *s >= i16::MIN && *s <= i16::MAX));
        assert_eq!(out[0], i16::MAX);
        assert_eq!(out[6], i16::MIN);

        assert_eq!(clamp_to_i16(40_000.0), i16::MAX);
        assert_eq!(clamp_to_i16(-40_000.0), i16::MIN);
        assert_eq!(clamp_to_i16(32_767.4_f64.round()), i16::MAX);
    }

    #[test]
    fn is_deterministic() {
        let input = ramp(10_007);
        assert_eq!(resample(&input, 6_151), resample(&input, 6_151));
    }

    #[test]
    fn converges_on_requested_duration() {
        let input = ramp(500_000);
        let out = resample(&input, 296_280);
        assert_eq!(out.len(), 296_280);
        assert_eq!(out[0], input[0]);
        assert_eq!(out[296_279], input[499_999]);
    }
}
