//! Fingerprint pipeline glue.
//!
//! Wires frame extraction, peak selection, quantization, denoising and
//! differencing together to produce a [`Fingerprint`].

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::observer::{PipelineObserver, PipelineStage, TracingObserver};
use crate::operations::fft_backends::{RustFftPowerSpectrum, SpectralPrimitive};
use crate::operations::peak_picking::select_peaks_in_band;
use crate::operations::processing::{denoise_with_min_run, differentiate, quantize_all};
use crate::operations::transforms::{frame_geometry, power_spectrogram_with};
use crate::operations::{AudioFingerprinting, FingerprintConfig};
use crate::{FingerprintError, FingerprintResult, SampleStream};

/// Ordered sequence of normalized inter-note frequency deltas.
///
/// Values only mean something in sequence; two fingerprints of different
/// lengths are compared through alignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(Vec<i32>);

impl Fingerprint {
    /// Wrap a vector of deltas.
    pub const fn new(values: Vec<i32>) -> Self {
        Self(values)
    }

    /// Borrow the deltas.
    pub fn values(&self) -> &[i32] {
        &self.0
    }

    /// Consume the fingerprint, returning the deltas.
    pub fn into_inner(self) -> Vec<i32> {
        self.0
    }
}

impl Deref for Fingerprint {
    type Target = [i32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[i32]> for Fingerprint {
    fn as_ref(&self) -> &[i32] {
        &self.0
    }
}

impl From<Vec<i32>> for Fingerprint {
    fn from(values: Vec<i32>) -> Self {
        Self(values)
    }
}

impl FromIterator<i32> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Runs the fingerprinting pipeline with a fixed configuration.
///
/// # Examples
///
/// ```rust
/// use melodic_fingerprint::{Fingerprinter, SampleStream};
/// use melodic_fingerprint::operations::FingerprintConfig;
///
/// let fingerprinter = Fingerprinter::new(FingerprintConfig::default()).unwrap();
/// let silence = SampleStream::from_vec(vec![0.0; 100], 44100).unwrap();
/// // shorter than one window
/// assert!(fingerprinter.fingerprint(&silence).unwrap().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Fingerprinter<O = TracingObserver> {
    config: FingerprintConfig,
    observer: O,
}

impl Fingerprinter<TracingObserver> {
    /// Create a fingerprinter that reports progress through `tracing`.
    ///
    /// # Errors
    /// Returns [`FingerprintError::InvalidParameter`] if the configuration is invalid.
    pub fn new(config: FingerprintConfig) -> FingerprintResult<Self> {
        Self::with_observer(config, TracingObserver)
    }
}

impl<O: PipelineObserver> Fingerprinter<O> {
    /// Create a fingerprinter that reports progress to `observer`.
    ///
    /// # Errors
    /// Returns [`FingerprintError::InvalidParameter`] if the configuration is invalid.
    pub fn with_observer(config: FingerprintConfig, observer: O) -> FingerprintResult<Self> {
        config
            .validate()
            .map_err(|e| FingerprintError::invalid_parameter("fingerprint_config", e))?;
        Ok(Self { config, observer })
    }

    /// The configuration this fingerprinter runs with.
    pub const fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Fingerprint a stream with the default `rustfft` power spectrum.
    ///
    /// # Errors
    /// Returns [`FingerprintError::InvalidParameter`] if the configuration
    /// does not yield a usable frame geometry at the stream's sample rate.
    pub fn fingerprint(&self, stream: &SampleStream) -> FingerprintResult<Fingerprint> {
        let mut primitive = RustFftPowerSpectrum::with_window(self.config.window);
        self.fingerprint_with(stream, &mut primitive)
    }

    /// Fingerprint a stream with a caller-supplied spectral primitive.
    ///
    /// # Errors
    /// Returns [`FingerprintError::InvalidParameter`] if the configuration
    /// does not yield a usable frame geometry at the stream's sample rate.
    pub fn fingerprint_with<P: SpectralPrimitive + ?Sized>(
        &self,
        stream: &SampleStream,
        primitive: &mut P,
    ) -> FingerprintResult<Fingerprint> {
        let geometry = frame_geometry(&self.config, stream.sample_rate())?;
        self.observer.on_start(stream, &geometry);

        if stream.duration_seconds() < 1.0 {
            warn!(
                seconds = stream.duration_seconds(),
                "short recording, match may be unreliable"
            );
        }

        let spectrogram = power_spectrogram_with(stream, geometry, primitive)?;
        self.observer
            .on_stage(PipelineStage::Spectrogram, spectrogram.num_frames());

        let peaks = select_peaks_in_band(spectrogram.view(), stream.sample_rate(), &self.config.band);
        self.observer.on_stage(PipelineStage::Peaks, peaks.len());

        let quantized = quantize_all(&peaks);
        self.observer.on_stage(PipelineStage::Quantized, quantized.len());

        let denoised = denoise_with_min_run(&quantized, self.config.min_run_length);
        self.observer.on_stage(PipelineStage::Denoised, denoised.len());

        let fingerprint = Fingerprint::new(differentiate(&denoised));
        self.observer
            .on_stage(PipelineStage::Fingerprint, fingerprint.len());

        Ok(fingerprint)
    }
}

impl AudioFingerprinting for SampleStream {
    fn fingerprint(&self, config: &FingerprintConfig) -> FingerprintResult<Fingerprint> {
        Fingerprinter::new(config.clone())?.fingerprint(self)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use std::f64::consts::PI;
    use std::sync::Mutex;

    /// Generate a melody of equal-length pure tones.
    pub(crate) fn generate_melody(notes: &[f64], note_seconds: f64, sample_rate: u32) -> SampleStream {
        let per_note = (note_seconds * f64::from(sample_rate)) as usize;
        let mut samples = Vec::with_capacity(per_note * notes.len());
        let mut phase = 0.0f64;
        for &freq in notes {
            let step = 2.0 * PI * freq / f64::from(sample_rate);
            for _ in 0..per_note {
                samples.push((0.5 * phase.sin()) as f32);
                phase += step;
            }
        }
        SampleStream::from_vec(samples, sample_rate).unwrap()
    }

    #[derive(Default)]
    struct RecordingObserver {
        stages: Mutex<Vec<(PipelineStage, usize)>>,
    }

    impl PipelineObserver for RecordingObserver {
        fn on_stage(&self, stage: PipelineStage, count: usize) {
            self.stages.lock().unwrap().push((stage, count));
        }
    }

    #[test]
    fn test_short_stream_gives_empty_fingerprint() {
        let stream = SampleStream::from_vec(vec![0.2; 500], 8000).unwrap();
        let fingerprint = stream.fingerprint(&FingerprintConfig::default()).unwrap();
        assert!(fingerprint.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected_before_processing() {
        let config = FingerprintConfig::with_window(100.0, 1.5);
        assert!(Fingerprinter::new(config).is_err());
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let stream = generate_melody(&[440.0, 660.0, 520.0, 880.0, 700.0], 0.5, 8000);
        let config = FingerprintConfig::default();
        let first = stream.fingerprint(&config).unwrap();
        let second = stream.fingerprint(&config).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_tone_has_no_deltas() {
        let stream = generate_melody(&[440.0], 2.0, 8000);
        let fingerprint = stream.fingerprint(&FingerprintConfig::default()).unwrap();
        assert!(fingerprint.is_empty());
    }

    #[test]
    fn test_two_tones_give_one_delta() {
        // 1024-sample windows at 8 kHz: 7.8125 Hz bins; 500 Hz -> 500, 1000 Hz -> 1000
        let stream = generate_melody(&[500.0, 1000.0], 1.0, 8000);
        let fingerprint = stream.fingerprint(&FingerprintConfig::default()).unwrap();
        assert_eq!(fingerprint.values(), &[50]);
    }

    #[test]
    fn test_observer_sees_every_stage_in_order() {
        let stream = generate_melody(&[500.0, 1000.0], 1.0, 8000);
        let observer = RecordingObserver::default();
        let fingerprinter = Fingerprinter::with_observer(FingerprintConfig::default(), &observer).unwrap();
        let fingerprint = fingerprinter.fingerprint(&stream).unwrap();

        let stages = observer.stages.lock().unwrap();
        let order: Vec<PipelineStage> = stages.iter().map(|(stage, _)| *stage).collect();
        assert_eq!(
            order,
            vec![
                PipelineStage::Spectrogram,
                PipelineStage::Peaks,
                PipelineStage::Quantized,
                PipelineStage::Denoised,
                PipelineStage::Fingerprint,
            ]
        );
        // 16000 samples, 1024 window, 512 hop
        assert_eq!(stages[0].1, 30);
        assert_eq!(stages[1].1, 30);
        assert_eq!(stages[4].1, fingerprint.len());
    }

    #[test]
    fn test_noop_observer() {
        let stream = generate_melody(&[500.0, 1000.0], 1.0, 8000);
        let fingerprinter = Fingerprinter::with_observer(FingerprintConfig::default(), NoopObserver).unwrap();
        assert_eq!(fingerprinter.fingerprint(&stream).unwrap().len(), 1);
    }

    #[test]
    fn test_fingerprint_serializes_as_plain_array() {
        let fingerprint = Fingerprint::from(vec![1, -2, 3]);
        let json = serde_json::to_string(&fingerprint).unwrap();
        assert_eq!(json, "[1,-2,3]");
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fingerprint);
    }
}
