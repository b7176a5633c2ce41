//! Supporting types, configuration and tuning constants for the
//! fingerprinting pipeline.
//!
//! The band limits, quantization steps and run-length rule below are
//! empirical tuning values. They are kept as named constants so they can be
//! adjusted without touching the algorithms that consume them.

use serde::{Deserialize, Serialize};

use super::transforms::frame_geometry;
use crate::FingerprintResult;

/// Lowest frequency (Hz) considered when selecting a frame's peak.
pub const MIN_PEAK_FREQUENCY_HZ: f64 = 300.0;

/// Highest frequency (Hz) considered when selecting a frame's peak.
pub const MAX_PEAK_FREQUENCY_HZ: f64 = 5000.0;

/// Frequencies at or above this value use the coarse quantization step.
pub const QUANTIZATION_SPLIT_HZ: f64 = 2000.0;

/// Quantization step (Hz) below [`QUANTIZATION_SPLIT_HZ`].
pub const FINE_QUANTIZATION_STEP_HZ: f64 = 10.0;

/// Quantization step (Hz) at or above [`QUANTIZATION_SPLIT_HZ`].
pub const COARSE_QUANTIZATION_STEP_HZ: f64 = 20.0;

/// Minimum number of consecutive frames a frequency must persist to survive denoising.
pub const MIN_RUN_LENGTH: usize = 2;

/// Divisor applied to inter-note deltas when building the fingerprint.
pub const DELTA_NORMALIZATION_DIVISOR: f64 = 10.0;

/// Default analysis window length in milliseconds.
pub const DEFAULT_WINDOW_SIZE_MS: f64 = 100.0;

/// Default overlap ratio between consecutive windows.
pub const DEFAULT_OVERLAP: f64 = 0.5;

/// Default number of ranked candidates a presentation layer shows.
pub const DEFAULT_TOP_RESULTS: usize = 5;

/// Window functions applied to a frame before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowType {
    /// Rectangular window (no windowing)
    Rectangular,
    /// Hann window, `0.5 - 0.5 * cos(2πi / (N - 1))`
    #[default]
    Hanning,
}

/// Inclusive frequency band searched by the peak selector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    /// Lower edge in Hz
    pub min_hz: f64,
    /// Upper edge in Hz
    pub max_hz: f64,
}

impl FrequencyBand {
    /// The melodic band used for fingerprinting, 300 Hz to 5000 Hz.
    pub const fn melodic() -> Self {
        Self {
            min_hz: MIN_PEAK_FREQUENCY_HZ,
            max_hz: MAX_PEAK_FREQUENCY_HZ,
        }
    }

    /// Create a custom band.
    pub const fn new(min_hz: f64, max_hz: f64) -> Self {
        Self { min_hz, max_hz }
    }

    /// Validate the band edges.
    pub fn validate(&self) -> Result<(), String> {
        if !self.min_hz.is_finite() || !self.max_hz.is_finite() {
            return Err("Band edges must be finite".to_string());
        }
        if self.min_hz < 0.0 {
            return Err("Band lower edge must be non-negative".to_string());
        }
        if self.max_hz < self.min_hz {
            return Err("Band upper edge must not be below the lower edge".to_string());
        }
        Ok(())
    }
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self::melodic()
    }
}

/// Frame length and stride derived once per pipeline run.
///
/// Every frame of a run shares this geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    /// Samples per frame; always a power of two
    pub window_samples: usize,
    /// Samples between the starts of consecutive frames; always at least one
    pub hop_size: usize,
}

impl FrameGeometry {
    /// Number of power spectrum bins a frame of this geometry produces.
    pub const fn bin_count(&self) -> usize {
        self.window_samples / 2
    }

    /// Number of whole frames that fit in a stream of `len` samples.
    pub const fn frame_count(&self, len: usize) -> usize {
        if len < self.window_samples {
            0
        } else {
            (len - self.window_samples) / self.hop_size + 1
        }
    }
}

/// Configuration for turning a sample stream into a fingerprint.
///
/// The defaults are 100 ms Hann windows with 50% overlap, peaks restricted
/// to the melodic band, and frequencies kept only when they persist across
/// two consecutive frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Requested window length in milliseconds (rounded to a power-of-two sample count)
    pub window_size_ms: f64,
    /// Overlap ratio between consecutive windows, in `[0, 1)`
    pub overlap: f64,
    /// Window function applied before the transform
    pub window: WindowType,
    /// Band searched for each frame's dominant frequency
    pub band: FrequencyBand,
    /// Minimum run length kept by the denoiser
    pub min_run_length: usize,
}

impl FingerprintConfig {
    /// Create a fingerprint configuration with default settings.
    pub const fn new() -> Self {
        Self {
            window_size_ms: DEFAULT_WINDOW_SIZE_MS,
            overlap: DEFAULT_OVERLAP,
            window: WindowType::Hanning,
            band: FrequencyBand::melodic(),
            min_run_length: MIN_RUN_LENGTH,
        }
    }

    /// Create a configuration with a custom window length and overlap.
    ///
    /// # Arguments
    /// * `window_size_ms` - Window length in milliseconds
    /// * `overlap` - Overlap ratio in `[0, 1)`
    pub const fn with_window(window_size_ms: f64, overlap: f64) -> Self {
        Self {
            window_size_ms,
            overlap,
            window: WindowType::Hanning,
            band: FrequencyBand::melodic(),
            min_run_length: MIN_RUN_LENGTH,
        }
    }

    /// Set the window function.
    pub fn set_window_type(&mut self, window: WindowType) {
        self.window = window;
    }

    /// Set the peak search band.
    pub fn set_band(&mut self, band: FrequencyBand) {
        self.band = band;
    }

    /// Derive the frame geometry at `sample_rate`.
    ///
    /// # Errors
    /// Returns [`FingerprintError::InvalidParameter`](crate::FingerprintError::InvalidParameter)
    /// if the configuration does not yield a window of at least two samples
    /// and a hop of at least one.
    pub fn geometry(&self, sample_rate: u32) -> FingerprintResult<FrameGeometry> {
        frame_geometry(self, sample_rate)
    }

    /// Validate the parts of the configuration that do not depend on the sample rate.
    pub fn validate(&self) -> Result<(), String> {
        if !self.window_size_ms.is_finite() || self.window_size_ms <= 0.0 {
            return Err("Window size must be a positive number of milliseconds".to_string());
        }

        if !(0.0..1.0).contains(&self.overlap) {
            return Err("Overlap must be in the range [0, 1)".to_string());
        }

        if self.min_run_length == 0 {
            return Err("Minimum run length must be greater than 0".to_string());
        }

        self.band.validate()
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FingerprintConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size_ms, 100.0);
        assert_eq!(config.overlap, 0.5);
        assert_eq!(config.band, FrequencyBand::new(300.0, 5000.0));
    }

    #[test]
    fn test_overlap_must_be_below_one() {
        assert!(FingerprintConfig::with_window(100.0, 1.0).validate().is_err());
        assert!(FingerprintConfig::with_window(100.0, -0.1).validate().is_err());
        assert!(FingerprintConfig::with_window(100.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_window_size_must_be_positive() {
        assert!(FingerprintConfig::with_window(0.0, 0.5).validate().is_err());
        assert!(FingerprintConfig::with_window(f64::NAN, 0.5).validate().is_err());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut config = FingerprintConfig::new();
        config.set_band(FrequencyBand::new(4000.0, 1000.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_geometry_at_8000() {
        // 800 samples rounds to 1024
        let geometry = FingerprintConfig::default().geometry(8000).unwrap();
        assert_eq!(geometry.window_samples, 1024);
        assert_eq!(geometry.hop_size, 512);
        assert!(FingerprintConfig::default().geometry(0).is_err());
    }

    #[test]
    fn test_frame_count() {
        let geometry = FrameGeometry {
            window_samples: 1024,
            hop_size: 512,
        };
        assert_eq!(geometry.bin_count(), 512);
        assert_eq!(geometry.frame_count(1023), 0);
        assert_eq!(geometry.frame_count(1024), 1);
        assert_eq!(geometry.frame_count(8192), 15);
    }
}
