//! Dominant-frequency selection per frame.
//!
//! Each frame contributes exactly one peak: the frequency of its strongest
//! bin inside a fixed band. Restricting the search to the melodic band
//! keeps bass rumble and high-frequency hiss from winning.

use ndarray::ArrayView2;

use super::transforms::Spectrogram;
use super::types::FrequencyBand;

/// Select one peak frequency (Hz) per frame within the melodic band.
///
/// Returns an empty vector for an empty spectrogram.
///
/// # Examples
///
/// ```rust
/// use melodic_fingerprint::operations::peak_picking::select_peaks;
/// use melodic_fingerprint::operations::transforms::Spectrogram;
///
/// // 8 bins at 8000 Hz -> 500 Hz per bin; band covers bins 0..=7
/// let mut spectrum = vec![0.0; 8];
/// spectrum[3] = 10.0;
/// let spectrogram = Spectrogram::from_rows(vec![spectrum], 8, 8000).unwrap();
/// assert_eq!(select_peaks(&spectrogram), vec![1500.0]);
/// ```
pub fn select_peaks(spectrogram: &Spectrogram) -> Vec<f64> {
    select_peaks_in_band(
        spectrogram.view(),
        spectrogram.sample_rate(),
        &FrequencyBand::melodic(),
    )
}

/// Select one peak frequency (Hz) per frame within `band`.
///
/// `spectra` is `frames × bins`. The bin width is derived from the bin
/// count, `sample_rate / (2 × bins)`. Within the band the first bin holding
/// the maximum power wins, so ties resolve to the lowest frequency.
pub fn select_peaks_in_band(spectra: ArrayView2<'_, f64>, sample_rate: u32, band: &FrequencyBand) -> Vec<f64> {
    let (frames, bin_count) = spectra.dim();
    if frames == 0 || bin_count == 0 {
        return Vec::new();
    }

    let resolution = f64::from(sample_rate) / (2.0 * bin_count as f64);
    let (min_bin, max_bin) = band_bins(band, resolution, bin_count);

    spectra
        .rows()
        .into_iter()
        .map(|frame| {
            let mut max_power = f64::NEG_INFINITY;
            let mut peak_bin = min_bin;
            for bin in min_bin..=max_bin {
                if frame[bin] > max_power {
                    max_power = frame[bin];
                    peak_bin = bin;
                }
            }
            peak_bin as f64 * resolution
        })
        .collect()
}

/// Inclusive bin range covering `band`, clamped to the spectrum.
///
/// When the band starts above Nyquist the range is empty and every frame
/// reports the band's lower bin.
fn band_bins(band: &FrequencyBand, resolution: f64, bin_count: usize) -> (usize, usize) {
    let min_bin = (band.min_hz / resolution).floor() as usize;
    let max_bin = ((band.max_hz / resolution).floor() as usize).min(bin_count - 1);
    (min_bin, max_bin)
}
