//! Error types and result utilities for fingerprinting and matching.

use thiserror::Error;

/// Convenience type alias for results that may contain FingerprintError
pub type FingerprintResult<T> = Result<T, FingerprintError>;

/// Error types that can occur while fingerprinting or matching audio.
///
/// Degenerate inputs (empty sample streams, empty spectrograms, empty
/// fingerprints) are not errors; they flow through the pipeline as empty
/// sequences or as a no-match result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FingerprintError {
    /// Error that occurs when invalid parameters are provided to an operation.
    ///
    /// This covers window sizes that derive fewer than two samples, overlaps
    /// outside `[0, 1)`, zero sample rates and anything that yields a hop
    /// size below one sample. Raised before any frame is processed.
    #[error("Invalid parameter error: {0}")]
    InvalidParameter(String),

    /// The spectral primitive could not transform a frame.
    ///
    /// The frame extractor recovers from this by truncating the spectrogram
    /// at `frame`.
    #[error("Spectral analysis failed at frame {frame}: {reason}")]
    SpectralFailure {
        /// Index of the frame that failed.
        frame: usize,
        /// Why the primitive rejected the frame.
        reason: String,
    },

    /// Error that occurs when array dimensions don't match expected values.
    ///
    /// This happens when spectrogram rows disagree in bin count, or a frame
    /// does not match the transform size.
    #[error("Dimension mismatch error: {0}")]
    DimensionMismatch(String),

    /// A song with the same id is already present in the library.
    #[error("Duplicate song id: {0}")]
    DuplicateSong(String),
}

impl FingerprintError {
    /// Create an invalid parameter error for a named parameter.
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter(format!("{name}: {}", reason.into()))
    }

    /// Create a spectral failure for the frame at `frame`.
    pub fn spectral_failure(frame: usize, reason: impl Into<String>) -> Self {
        Self::SpectralFailure {
            frame,
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration error that must be fixed by the caller.
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }
}
