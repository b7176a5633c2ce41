//! Fingerprinting operations.
//!
//! The pipeline stages, leaves first:
//!
//! - [`fft_backends`] - Spectral primitive trait and the `rustfft` power spectrum
//! - [`transforms`] - Frame extraction into a power spectrogram
//! - [`peak_picking`] - One dominant frequency per frame
//! - [`processing`] - Quantization, run-length denoising, differencing
//! - [`traits`] - Operation traits implemented for [`SampleStream`](crate::SampleStream)
//! - [`types`] - Configuration, frame geometry and tuning constants
//!
//! ## Quick Start
//!
//! ```rust
//! use melodic_fingerprint::SampleStream;
//! use melodic_fingerprint::operations::*;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = SampleStream::from_vec(vec![0.0; 44100], 44100)?;
//! let config = FingerprintConfig::default();
//!
//! let spectrogram = stream.power_spectrogram(&config)?;
//! let peaks = peak_picking::select_peaks(&spectrogram);
//! let quantized = processing::quantize_all(&peaks);
//! let denoised = processing::denoise(&quantized);
//! let deltas = processing::differentiate(&denoised);
//! # Ok(())
//! # }
//! ```

pub mod fft_backends;
pub mod peak_picking;
pub mod processing;
pub mod traits;
pub mod transforms;
pub mod types;

pub use fft_backends::{RustFftPowerSpectrum, SpectralPrimitive};
pub use traits::{AudioFingerprinting, AudioSpectral};
pub use transforms::Spectrogram;
pub use types::{FingerprintConfig, FrameGeometry, FrequencyBand, WindowType};
