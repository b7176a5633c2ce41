//! Operation traits implemented for [`SampleStream`](crate::SampleStream).
//!
//! The traits split spectral analysis from full fingerprint extraction so
//! callers that only want a spectrogram do not pull in the rest of the
//! pipeline.

use super::transforms::Spectrogram;
use super::types::{FingerprintConfig, FrameGeometry};
use crate::{Fingerprint, FingerprintResult};

/// Spectral analysis of a sample stream.
pub trait AudioSpectral {
    /// Derive the frame geometry for `config` at this stream's sample rate.
    ///
    /// # Errors
    /// Returns an invalid-parameter error for an unusable configuration.
    fn frame_geometry(&self, config: &FingerprintConfig) -> FingerprintResult<FrameGeometry>;

    /// Computes the power spectrogram of overlapping frames.
    ///
    /// # Errors
    /// Returns an invalid-parameter error for an unusable configuration.
    fn power_spectrogram(&self, config: &FingerprintConfig) -> FingerprintResult<Spectrogram>;
}

/// Fingerprint extraction from a sample stream.
pub trait AudioFingerprinting: AudioSpectral {
    /// Run the full pipeline and return the fingerprint.
    ///
    /// A stream shorter than one window produces an empty fingerprint.
    ///
    /// # Errors
    /// Returns an invalid-parameter error for an unusable configuration.
    fn fingerprint(&self, config: &FingerprintConfig) -> FingerprintResult<Fingerprint>;
}
