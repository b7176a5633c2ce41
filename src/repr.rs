//! Sample stream representation.
//!
//! A [`SampleStream`] is the single input the fingerprinting core accepts:
//! mono floating-point amplitudes in `[-1, 1]` plus the rate they were
//! sampled at. Whether they came from a decoded file or a capture device is
//! irrelevant to the core.

use std::fmt::Display;

use ndarray::{Array1, ArrayView1};

use crate::{FingerprintError, FingerprintResult};

/// Mono audio samples with their sample rate.
///
/// Immutable once constructed; the pipeline only ever borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleStream {
    data: Array1<f32>,
    sample_rate: u32,
}

impl SampleStream {
    /// Creates a new mono stream from an ndarray.
    ///
    /// # Errors
    /// Returns [`FingerprintError::InvalidParameter`] if `sample_rate` is zero.
    pub fn new_mono(data: Array1<f32>, sample_rate: u32) -> FingerprintResult<Self> {
        if sample_rate == 0 {
            return Err(FingerprintError::invalid_parameter(
                "sample_rate",
                "must be greater than 0",
            ));
        }
        Ok(Self { data, sample_rate })
    }

    /// Creates a new mono stream from an owned vector.
    ///
    /// # Errors
    /// Returns [`FingerprintError::InvalidParameter`] if `sample_rate` is zero.
    pub fn from_vec(samples: Vec<f32>, sample_rate: u32) -> FingerprintResult<Self> {
        Self::new_mono(Array1::from_vec(samples), sample_rate)
    }

    /// Sample rate in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples in the stream.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the stream holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Duration of the stream in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.data.len() as f64 / f64::from(self.sample_rate)
    }

    /// Borrow the samples as an ndarray view.
    pub fn view(&self) -> ArrayView1<'_, f32> {
        self.data.view()
    }

    /// Borrow the samples as a contiguous slice.
    ///
    /// Owned `Array1` storage is always contiguous, so this only returns
    /// `None` for a non-standard layout.
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.data.as_slice()
    }
}

impl Display for SampleStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SampleStream: {} samples @ {} Hz ({:.2}s)",
            self.len(),
            self.sample_rate,
            self.duration_seconds()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use ndarray::array;

    #[test]
    fn test_zero_sample_rate_rejected() {
        let result = SampleStream::new_mono(array![0.0f32, 0.1], 0);
        assert!(matches!(result, Err(FingerprintError::InvalidParameter(_))));
    }

    #[test]
    fn test_duration() {
        let stream = SampleStream::from_vec(vec![0.0; 22050], 44100).unwrap();
        assert_eq!(stream.len(), 22050);
        assert_approx_eq!(stream.duration_seconds(), 0.5, 1e-12);
        assert!(stream.as_slice().is_some());
    }

    #[test]
    fn test_empty_stream() {
        let stream = SampleStream::from_vec(Vec::new(), 8000).unwrap();
        assert!(stream.is_empty());
        assert_eq!(stream.to_string(), "SampleStream: 0 samples @ 8000 Hz (0.00s)");
    }
}
