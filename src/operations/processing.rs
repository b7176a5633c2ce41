//! Post-processing of the peak sequence into fingerprint values.
//!
//! Three pure stages run in order: adaptive quantization, run-length
//! denoising and differencing. None of them carries state across calls.

use super::types::{
    COARSE_QUANTIZATION_STEP_HZ, DELTA_NORMALIZATION_DIVISOR, FINE_QUANTIZATION_STEP_HZ,
    MIN_RUN_LENGTH, QUANTIZATION_SPLIT_HZ,
};

/// Round a frequency to a resolution that depends on its own magnitude.
///
/// Below 2000 Hz the step is 10 Hz; at or above it the step is 20 Hz.
///
/// # Examples
///
/// ```rust
/// use melodic_fingerprint::operations::processing::quantize;
///
/// assert_eq!(quantize(1995.0), 2000.0);
/// assert_eq!(quantize(2005.0), 2000.0);
/// assert_eq!(quantize(2011.0), 2020.0);
/// ```
pub fn quantize(frequency: f64) -> f64 {
    let step = if frequency < QUANTIZATION_SPLIT_HZ {
        FINE_QUANTIZATION_STEP_HZ
    } else {
        COARSE_QUANTIZATION_STEP_HZ
    };
    (frequency / step).round() * step
}

/// Quantize every frequency of a peak sequence.
pub fn quantize_all(frequencies: &[f64]) -> Vec<f64> {
    frequencies.iter().map(|&f| quantize(f)).collect()
}

/// Collapse runs and drop values that do not persist for two frames.
///
/// # Examples
///
/// ```rust
/// use melodic_fingerprint::operations::processing::denoise;
///
/// assert_eq!(denoise(&[5, 5, 5, 7, 7, 9]), vec![5, 7]);
/// assert!(denoise(&[1, 2, 3]).is_empty());
/// ```
pub fn denoise<T: PartialEq + Copy>(values: &[T]) -> Vec<T> {
    denoise_with_min_run(values, MIN_RUN_LENGTH)
}

/// Run-length denoising with a configurable minimum run.
///
/// Each maximal run of equal adjacent values becomes a single output value
/// if the run is at least `min_run` long, and is dropped otherwise.
pub fn denoise_with_min_run<T: PartialEq + Copy>(values: &[T], min_run: usize) -> Vec<T> {
    let Some((&first, rest)) = values.split_first() else {
        return Vec::new();
    };

    let mut kept = Vec::new();
    let mut current = first;
    let mut count = 1usize;

    for &value in rest {
        if value == current {
            count += 1;
        } else {
            if count >= min_run {
                kept.push(current);
            }
            current = value;
            count = 1;
        }
    }

    if count >= min_run {
        kept.push(current);
    }

    kept
}

/// Convert a frequency sequence into normalized inter-note deltas.
///
/// Produces `len - 1` values, each `round((f[i] - f[i-1]) / 10)`, or an
/// empty vector for fewer than two inputs. Halves round away from zero.
///
/// # Examples
///
/// ```rust
/// use melodic_fingerprint::operations::processing::differentiate;
///
/// assert_eq!(differentiate(&[100.0, 110.0, 105.0]), vec![1, -1]);
/// ```
pub fn differentiate(frequencies: &[f64]) -> Vec<i32> {
    if frequencies.len() < 2 {
        return Vec::new();
    }

    frequencies
        .windows(2)
        .map(|pair| ((pair[1] - pair[0]) / DELTA_NORMALIZATION_DIVISOR).round() as i32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_fine_branch() {
        assert_eq!(quantize(1995.0), 2000.0);
        assert_eq!(quantize(444.0), 440.0);
        assert_eq!(quantize(446.0), 450.0);
        assert_eq!(quantize(0.0), 0.0);
    }

    #[test]
    fn test_quantize_coarse_branch() {
        assert_eq!(quantize(2005.0), 2000.0);
        assert_eq!(quantize(2000.0), 2000.0);
        assert_eq!(quantize(2029.0), 2020.0);
        assert_eq!(quantize(2031.0), 2040.0);
    }

    #[test]
    fn test_quantize_all_is_elementwise() {
        assert_eq!(quantize_all(&[301.0, 1999.0, 4999.0]), vec![300.0, 2000.0, 5000.0]);
        assert!(quantize_all(&[]).is_empty());
    }

    #[test]
    fn test_denoise_examples() {
        assert_eq!(denoise(&[5, 5, 5, 7, 7, 9]), vec![5, 7]);
        assert!(denoise(&[1, 2, 3]).is_empty());
        assert!(denoise::<i32>(&[]).is_empty());
    }

    #[test]
    fn test_denoise_single_run() {
        assert_eq!(denoise(&[440.0, 440.0, 440.0, 440.0]), vec![440.0]);
        assert!(denoise(&[440.0]).is_empty());
    }

    #[test]
    fn test_denoise_non_adjacent_repeats_kept_separately() {
        assert_eq!(denoise(&[3, 3, 4, 3, 3]), vec![3, 3]);
    }

    #[test]
    fn test_denoise_custom_min_run() {
        assert_eq!(denoise_with_min_run(&[1, 1, 2, 2, 2], 3), vec![2]);
        assert_eq!(denoise_with_min_run(&[1, 2, 3], 1), vec![1, 2, 3]);
    }

    #[test]
    fn test_differentiate_examples() {
        assert_eq!(differentiate(&[100.0, 110.0, 105.0]), vec![1, -1]);
        assert!(differentiate(&[100.0]).is_empty());
        assert!(differentiate(&[]).is_empty());
    }

    #[test]
    fn test_differentiate_is_offset_invariant() {
        let melody = [440.0, 500.0, 470.0, 600.0];
        let shifted: Vec<f64> = melody.iter().map(|f| f + 200.0).collect();
        assert_eq!(differentiate(&melody), differentiate(&shifted));
        assert_eq!(differentiate(&melody), vec![6, -3, 13]);
    }
}
