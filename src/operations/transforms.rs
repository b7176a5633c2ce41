//! Spectral frame extraction.
//!
//! Slices a mono stream into overlapping power-of-two windows and obtains a
//! power spectrum for each one from a [`SpectralPrimitive`]. If the
//! primitive rejects a frame, extraction stops there and the frames already
//! produced are returned as a partial spectrogram.

use std::borrow::Cow;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use tracing::warn;

use super::fft_backends::{RustFftPowerSpectrum, SpectralPrimitive};
use super::traits::AudioSpectral;
use super::types::{FingerprintConfig, FrameGeometry};
use crate::{FingerprintError, FingerprintResult, SampleStream};

/// Power spectra of consecutive frames, one row per frame.
///
/// All rows share the same bin count; the matrix is `frames × bins`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    data: Array2<f64>,
    sample_rate: u32,
}

impl Spectrogram {
    /// Build a spectrogram from per-frame power spectra.
    ///
    /// # Errors
    /// Returns [`FingerprintError::DimensionMismatch`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f64>>, bin_count: usize, sample_rate: u32) -> FingerprintResult<Self> {
        if let Some(bad) = rows.iter().position(|row| row.len() != bin_count) {
            return Err(FingerprintError::DimensionMismatch(format!(
                "Spectrum {bad} has {} bins, expected {bin_count}",
                rows[bad].len()
            )));
        }

        let frames = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((frames, bin_count), flat)
            .map_err(|e| FingerprintError::DimensionMismatch(e.to_string()))?;

        Ok(Self { data, sample_rate })
    }

    /// Number of frames (rows).
    pub fn num_frames(&self) -> usize {
        self.data.nrows()
    }

    /// Number of bins per frame.
    pub fn bin_count(&self) -> usize {
        self.data.ncols()
    }

    /// Returns true if no frame was extracted.
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Sample rate of the stream the spectrogram was computed from.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Width of one bin in Hz, `sample_rate / (2 × bin_count)`.
    pub fn frequency_resolution(&self) -> f64 {
        f64::from(self.sample_rate) / (2.0 * self.bin_count() as f64)
    }

    /// Power spectrum of one frame.
    pub fn frame(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.num_frames()).then(|| self.data.row(index))
    }

    /// Iterate over frames in temporal order.
    pub fn frames(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.data.axis_iter(Axis(0))
    }

    /// Borrow the underlying `frames × bins` matrix.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}

/// Round `n` to the nearest power of two in the log domain.
///
/// `log2(n)` is rounded to the nearest integer, so the result may be above
/// or below `n`. Zero maps to zero. Returns `None` when the rounded power
/// does not fit in a `usize`.
///
/// # Examples
///
/// ```rust
/// use melodic_fingerprint::operations::transforms::nearest_power_of_two;
///
/// assert_eq!(nearest_power_of_two(4410), Some(4096));
/// assert_eq!(nearest_power_of_two(6000), Some(8192));
/// assert_eq!(nearest_power_of_two(usize::MAX), None);
/// ```
pub fn nearest_power_of_two(n: usize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    let exponent = (n as f64).log2().round();
    if exponent >= f64::from(usize::BITS) {
        return None;
    }
    1usize.checked_shl(exponent as u32)
}

/// Derive the frame geometry for a configuration at a given sample rate.
///
/// # Errors
/// Returns [`FingerprintError::InvalidParameter`] if the configuration is
/// invalid, the sample rate is zero, the window rounds to fewer than two
/// samples, or the overlap leaves a hop size below one sample.
pub fn frame_geometry(config: &FingerprintConfig, sample_rate: u32) -> FingerprintResult<FrameGeometry> {
    config
        .validate()
        .map_err(|e| FingerprintError::invalid_parameter("fingerprint_config", e))?;

    if sample_rate == 0 {
        return Err(FingerprintError::invalid_parameter(
            "sample_rate",
            "must be greater than 0",
        ));
    }

    let requested = (config.window_size_ms / 1000.0 * f64::from(sample_rate)).floor();
    // `as usize` saturates, so out-of-range requests must not reach the cast
    let rounded = if requested < usize::MAX as f64 {
        nearest_power_of_two(requested as usize)
    } else {
        None
    };
    let window_samples = rounded.ok_or_else(|| {
        FingerprintError::invalid_parameter(
            "window_size_ms",
            format!(
                "{}ms at {sample_rate} Hz is too long for a power-of-two window",
                config.window_size_ms
            ),
        )
    })?;

    if window_samples < 2 {
        return Err(FingerprintError::invalid_parameter(
            "window_size_ms",
            format!(
                "{}ms at {sample_rate} Hz gives a {window_samples}-sample window",
                config.window_size_ms
            ),
        ));
    }

    let hop_size = (window_samples as f64 * (1.0 - config.overlap)).floor() as usize;
    if hop_size < 1 {
        return Err(FingerprintError::invalid_parameter(
            "overlap",
            format!(
                "overlap {} leaves no hop for a {window_samples}-sample window",
                config.overlap
            ),
        ));
    }

    Ok(FrameGeometry {
        window_samples,
        hop_size,
    })
}

/// Compute a power spectrogram with a caller-supplied spectral primitive.
///
/// Frames start at `0, hop, 2·hop, …` while a whole window fits. The first
/// frame the primitive rejects ends extraction; everything before it is
/// returned. A stream shorter than one window yields an empty spectrogram.
///
/// # Errors
/// Only configuration-level problems are reported; spectral failures are
/// absorbed into truncation.
pub fn power_spectrogram_with<P: SpectralPrimitive + ?Sized>(
    stream: &SampleStream,
    geometry: FrameGeometry,
    primitive: &mut P,
) -> FingerprintResult<Spectrogram> {
    if geometry.hop_size == 0 {
        return Err(FingerprintError::invalid_parameter("hop_size", "must be at least 1"));
    }

    let samples: Cow<'_, [f32]> = match stream.as_slice() {
        Some(slice) => Cow::Borrowed(slice),
        None => Cow::Owned(stream.view().to_vec()),
    };

    let window_samples = geometry.window_samples;
    let bin_count = geometry.bin_count();
    let mut rows = Vec::with_capacity(geometry.frame_count(samples.len()));

    let mut start = 0;
    while start + window_samples <= samples.len() {
        let frame = &samples[start..start + window_samples];
        let index = rows.len();

        let spectrum = primitive
            .power_spectrum(frame, window_samples)
            .and_then(|spectrum| {
                if spectrum.len() == bin_count {
                    Ok(spectrum)
                } else {
                    Err(FingerprintError::DimensionMismatch(format!(
                        "primitive returned {} bins, expected {bin_count}",
                        spectrum.len()
                    )))
                }
            });

        match spectrum {
            Ok(spectrum) => rows.push(spectrum),
            Err(e) => {
                let failure = FingerprintError::spectral_failure(index, e.to_string());
                warn!(frame = index, sample_offset = start, error = %failure, "truncating spectrogram");
                break;
            }
        }

        start += geometry.hop_size;
    }

    Spectrogram::from_rows(rows, bin_count, stream.sample_rate())
}

/// Compute a power spectrogram using the default `rustfft` primitive.
///
/// # Errors
/// Returns [`FingerprintError::InvalidParameter`] for an invalid configuration.
pub fn power_spectrogram(stream: &SampleStream, config: &FingerprintConfig) -> FingerprintResult<Spectrogram> {
    let geometry = frame_geometry(config, stream.sample_rate())?;
    let mut primitive = RustFftPowerSpectrum::with_window(config.window);
    power_spectrogram_with(stream, geometry, &mut primitive)
}

impl AudioSpectral for SampleStream {
    fn frame_geometry(&self, config: &FingerprintConfig) -> FingerprintResult<FrameGeometry> {
        frame_geometry(config, self.sample_rate())
    }

    fn power_spectrogram(&self, config: &FingerprintConfig) -> FingerprintResult<Spectrogram> {
        power_spectrogram(self, config)
    }
}
