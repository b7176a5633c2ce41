//! Spectral primitive used by the frame extractor.
//!
//! The frame extractor does not compute transforms itself; it hands each
//! frame to a [`SpectralPrimitive`]. The default implementation,
//! [`RustFftPowerSpectrum`], windows the frame, runs a forward FFT through
//! `rustfft` and returns squared magnitudes of the first `N / 2` bins.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::types::WindowType;
use crate::{FingerprintError, FingerprintResult};

/// Trait for spectral primitive implementations
pub trait SpectralPrimitive {
    /// Computes the power spectrum of one frame.
    ///
    /// Returns `transform_size / 2` non-negative magnitudes, or an error when
    /// the frame is malformed (wrong length, unusable transform size).
    fn power_spectrum(&mut self, frame: &[f32], transform_size: usize)
    -> FingerprintResult<Vec<f64>>;
}

/// Windowed power spectrum backed by `rustfft`.
///
/// Plans and window coefficients are cached per transform size, so one
/// instance can be reused for a whole spectrogram.
pub struct RustFftPowerSpectrum {
    planner: FftPlanner<f64>,
    window_type: WindowType,
    cached_plans: HashMap<usize, Arc<dyn Fft<f64>>>,
    cached_windows: HashMap<usize, Vec<f64>>,
}

impl RustFftPowerSpectrum {
    /// Create a Hann-windowed power spectrum backend.
    pub fn new() -> Self {
        Self::with_window(WindowType::Hanning)
    }

    /// Create a backend that applies `window_type` before the transform.
    pub fn with_window(window_type: WindowType) -> Self {
        Self {
            planner: FftPlanner::new(),
            window_type,
            cached_plans: HashMap::new(),
            cached_windows: HashMap::new(),
        }
    }

    fn get_or_create_plan(&mut self, size: usize) -> Arc<dyn Fft<f64>> {
        if let Some(plan) = self.cached_plans.get(&size) {
            plan.clone()
        } else {
            let plan = self.planner.plan_fft_forward(size);
            self.cached_plans.insert(size, plan.clone());
            plan
        }
    }
}

impl Default for RustFftPowerSpectrum {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralPrimitive for RustFftPowerSpectrum {
    fn power_spectrum(
        &mut self,
        frame: &[f32],
        transform_size: usize,
    ) -> FingerprintResult<Vec<f64>> {
        if transform_size < 2 || !transform_size.is_power_of_two() {
            return Err(FingerprintError::DimensionMismatch(format!(
                "Transform size {transform_size} is not a power of two >= 2"
            )));
        }
        if frame.len() != transform_size {
            return Err(FingerprintError::DimensionMismatch(format!(
                "Frame has {} samples, transform expects {transform_size}",
                frame.len()
            )));
        }

        let window_type = self.window_type;
        let window = self
            .cached_windows
            .entry(transform_size)
            .or_insert_with(|| generate_window(transform_size, window_type));

        let mut buffer: Vec<Complex<f64>> = frame
            .iter()
            .zip(window.iter())
            .map(|(&sample, &w)| Complex::new(f64::from(sample) * w, 0.0))
            .collect();

        let fft = self.get_or_create_plan(transform_size);
        fft.process(&mut buffer);

        Ok(buffer[..transform_size / 2]
            .iter()
            .map(|c| c.norm_sqr())
            .collect())
    }
}

/// Generate window function coefficients.
pub(crate) fn generate_window(size: usize, window_type: WindowType) -> Vec<f64> {
    match window_type {
        WindowType::Rectangular => vec![1.0; size],
        WindowType::Hanning if size < 2 => vec![1.0; size],
        WindowType::Hanning => (0..size)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / (size - 1) as f64).cos())
            .collect(),
    }
}
