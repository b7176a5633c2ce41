//! Progress hooks for the fingerprinting pipeline.
//!
//! Stage reporting is kept out of the algorithms: the pipeline calls a
//! [`PipelineObserver`] after each stage with the number of elements it
//! produced, and the observer decides what to do with it.

use std::fmt;

use tracing::debug;

use crate::SampleStream;
use crate::operations::FrameGeometry;

/// Stages of the fingerprinting pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Power spectra extracted (count = frames)
    Spectrogram,
    /// One peak frequency per frame (count = peaks)
    Peaks,
    /// Peaks rounded to the adaptive grid (count = peaks)
    Quantized,
    /// Runs collapsed and singletons dropped (count = surviving values)
    Denoised,
    /// Normalized deltas (count = fingerprint length)
    Fingerprint,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Spectrogram => "spectrogram",
            Self::Peaks => "peaks",
            Self::Quantized => "quantized",
            Self::Denoised => "denoised",
            Self::Fingerprint => "fingerprint",
        };
        f.write_str(name)
    }
}

/// Receives pipeline progress.
pub trait PipelineObserver {
    /// Called once before extraction with the stream and derived geometry.
    fn on_start(&self, _stream: &SampleStream, _geometry: &FrameGeometry) {}

    /// Called after `stage` finished, with the number of elements it produced.
    fn on_stage(&self, stage: PipelineStage, count: usize);
}

/// Observer that emits `tracing` debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_start(&self, stream: &SampleStream, geometry: &FrameGeometry) {
        debug!(
            samples = stream.len(),
            sample_rate = stream.sample_rate(),
            window_samples = geometry.window_samples,
            hop_size = geometry.hop_size,
            "fingerprinting stream"
        );
    }

    fn on_stage(&self, stage: PipelineStage, count: usize) {
        debug!(%stage, count, "pipeline stage complete");
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_stage(&self, _stage: PipelineStage, _count: usize) {}
}

impl<O: PipelineObserver + ?Sized> PipelineObserver for &O {
    fn on_start(&self, stream: &SampleStream, geometry: &FrameGeometry) {
        (**self).on_start(stream, geometry);
    }

    fn on_stage(&self, stage: PipelineStage, count: usize) {
        (**self).on_stage(stage, count);
    }
}
