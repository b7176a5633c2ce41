//! Conversions from decoder or capture output into a [`SampleStream`].
//!
//! Decoders and capture devices hand over integer PCM, often interleaved.
//! The fingerprinting core wants mono `f32` in `[-1, 1]`, so this module
//! scales integer formats by their full-scale magnitude and averages
//! interleaved channels down to one.

use crate::{FingerprintError, FingerprintResult, SampleStream};

/// Sample formats that can be normalized to `f32` in `[-1, 1]`.
pub trait PcmSample: Copy {
    /// Convert this sample to a normalized amplitude.
    fn to_normalized(self) -> f32;
}

impl PcmSample for i16 {
    #[inline]
    fn to_normalized(self) -> f32 {
        f32::from(self) / 32768.0
    }
}

impl PcmSample for i32 {
    #[inline]
    fn to_normalized(self) -> f32 {
        (f64::from(self) / 2_147_483_648.0) as f32
    }
}

impl PcmSample for u8 {
    // unsigned 8-bit PCM is centred on 128
    #[inline]
    fn to_normalized(self) -> f32 {
        (f32::from(self) - 128.0) / 128.0
    }
}

impl PcmSample for f32 {
    #[inline]
    fn to_normalized(self) -> f32 {
        self.clamp(-1.0, 1.0)
    }
}

/// Normalize a mono PCM buffer into a [`SampleStream`].
///
/// # Errors
/// Returns [`FingerprintError::InvalidParameter`] if `sample_rate` is zero.
///
/// # Examples
///
/// ```rust
/// use melodic_fingerprint::conversions::mono_from_pcm;
///
/// let stream = mono_from_pcm(&[0i16, 16384, -32768], 44100).unwrap();
/// assert_eq!(stream.as_slice().unwrap(), &[0.0, 0.5, -1.0]);
/// ```
pub fn mono_from_pcm<T: PcmSample>(samples: &[T], sample_rate: u32) -> FingerprintResult<SampleStream> {
    let data: Vec<f32> = samples.iter().map(|&s| s.to_normalized()).collect();
    SampleStream::from_vec(data, sample_rate)
}

/// Average interleaved multi-channel PCM into a mono [`SampleStream`].
///
/// A trailing partial frame (fewer than `channels` samples) is dropped.
///
/// # Errors
/// Returns [`FingerprintError::InvalidParameter`] if `channels` or
/// `sample_rate` is zero.
pub fn downmix_interleaved<T: PcmSample>(
    samples: &[T],
    channels: usize,
    sample_rate: u32,
) -> FingerprintResult<SampleStream> {
    if channels == 0 {
        return Err(FingerprintError::invalid_parameter(
            "channels",
            "must be greater than 0",
        ));
    }

    let data: Vec<f32> = samples
        .chunks_exact(channels)
        .map(|frame| {
            frame.iter().map(|&s| s.to_normalized()).sum::<f32>() / channels as f32
        })
        .collect();

    SampleStream::from_vec(data, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_i16_full_scale() {
        assert_eq!(i16::MIN.to_normalized(), -1.0);
        assert_eq!(0i16.to_normalized(), 0.0);
        assert_approx_eq!(f64::from(i16::MAX.to_normalized()), 32767.0 / 32768.0, 1e-6);
    }

    #[test]
    fn test_u8_is_centred() {
        assert_eq!(128u8.to_normalized(), 0.0);
        assert_eq!(0u8.to_normalized(), -1.0);
    }

    #[test]
    fn test_downmix_stereo() {
        let interleaved = [16384i16, -16384, 32767, 32767, 100];
        let stream = downmix_interleaved(&interleaved, 2, 44100).unwrap();
        // trailing half-frame dropped
        assert_eq!(stream.len(), 2);
        let samples = stream.as_slice().unwrap();
        assert_eq!(samples[0], 0.0);
        assert_approx_eq!(f64::from(samples[1]), 32767.0 / 32768.0, 1e-6);
    }

    #[test]
    fn test_downmix_zero_channels_rejected() {
        let result = downmix_interleaved(&[0i16; 4], 0, 44100);
        assert!(result.is_err());
    }

    #[test]
    fn test_f32_is_clamped() {
        let stream = mono_from_pcm(&[1.5f32, -2.0, 0.25], 8000).unwrap();
        assert_eq!(stream.as_slice().unwrap(), &[1.0, -1.0, 0.25]);
    }
}
