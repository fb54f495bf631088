//! Per-frame RMS, zero-crossing rate, spectral flatness and harmonic-presence
//! feature extraction. Consumes the same magnitude spectrum the audio
//! front-end already computed; nothing here recomputes an FFT.

use crate::audio_frontend::SPECTRUM_LEN;

/// Zero-crossing rate is measured over only the first slice of the window.
pub const ZCR_WINDOW: usize = 2048;

/// Spectral flatness and harmonic-presence are restricted to the band the
/// lyre's strings actually live in.
pub const LYRE_BAND_MIN_HZ: f32 = 165.0;
pub const LYRE_BAND_MAX_HZ: f32 = 1100.0;

const HARMONIC_TOLERANCE_DB: f32 = 25.0;
const HARMONIC_SEARCH_FRACTION: f32 = 0.08;

#[derive(Debug, Clone, Copy, Default)]
pub struct Features {
    pub rms: f32,
    pub zcr: f32,
    pub spectral_flatness: f32,
    pub harmonic_present: bool,
}

pub fn rms(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = window.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / window.len() as f64).sqrt() as f32
}

pub fn zero_crossing_rate(window: &[f32]) -> f32 {
    let n = window.len().min(ZCR_WINDOW);
    if n < 2 {
        return 0.0;
    }
    let slice = &window[..n];
    let crossings = (1..n).filter(|&i| (slice[i] >= 0.0) != (slice[i - 1] >= 0.0)).count();
    crossings as f32 / n as f32
}

fn bin_width(sample_rate: u32, spectrum_len: usize) -> f32 {
    sample_rate as f32 / (2.0 * spectrum_len as f32)
}

/// Wiener entropy of the in-band spectrum: geometric mean over arithmetic
/// mean of linear power. Low = tonal, high = noise-like. Treats an empty or
/// degenerate band as noise rather than silence, per the gating cascade's
/// fail-closed stance.
pub fn spectral_flatness(spectrum_db: &[f32], sample_rate: u32) -> f32 {
    let width = bin_width(sample_rate, spectrum_db.len());
    if width <= 0.0 {
        return 1.0;
    }

    let powers: Vec<f64> = spectrum_db
        .iter()
        .enumerate()
        .filter_map(|(i, &db)| {
            let freq = i as f32 * width;
            (LYRE_BAND_MIN_HZ..=LYRE_BAND_MAX_HZ)
                .contains(&freq)
                .then(|| 10f64.powf(f64::from(db) / 10.0))
        })
        .collect();

    if powers.is_empty() {
        return 1.0;
    }

    let log_sum: f64 = powers.iter().map(|&p| (p + 1e-10).ln()).sum();
    let geometric_mean = (log_sum / powers.len() as f64).exp();
    let arithmetic_mean: f64 = powers.iter().sum::<f64>() / powers.len() as f64;

    if arithmetic_mean <= 0.0 {
        1.0
    } else {
        ((geometric_mean / arithmetic_mean) as f32).clamp(0.0, 1.0)
    }
}

/// Peak dB magnitude within a search window around the expected bin of the
/// `harmonic_index`-th multiple of `freq` (1.0 for the fundamental itself).
fn peak_db_near(spectrum_db: &[f32], sample_rate: u32, freq: f32, harmonic_index: f32) -> Option<f32> {
    if spectrum_db.is_empty() || freq <= 0.0 {
        return None;
    }
    let width = bin_width(sample_rate, spectrum_db.len());
    if width <= 0.0 {
        return None;
    }

    let target_hz = harmonic_index * freq;
    let expected_bin = (target_hz / width).round() as i64;
    let span = 1i64.max((target_hz * HARMONIC_SEARCH_FRACTION / width).round() as i64);

    let lo = (expected_bin - span).max(0) as usize;
    let hi = ((expected_bin + span).max(0) as usize).min(spectrum_db.len() - 1);
    if lo > hi {
        return None;
    }
    spectrum_db[lo..=hi].iter().copied().reduce(f32::max)
}

/// True when at least one of the 2nd/3rd harmonics of `fundamental_hz` shows
/// up within `HARMONIC_TOLERANCE_DB` of the fundamental's own peak.
pub fn harmonic_presence(spectrum_db: &[f32], sample_rate: u32, fundamental_hz: f32) -> bool {
    let Some(fundamental_db) = peak_db_near(spectrum_db, sample_rate, fundamental_hz, 1.0) else {
        return false;
    };

    [2.0, 3.0]
        .into_iter()
        .filter_map(|k| peak_db_near(spectrum_db, sample_rate, fundamental_hz, k))
        .any(|db| (db - fundamental_db).abs() <= HARMONIC_TOLERANCE_DB)
}

pub fn extract(
    time_window: &[f32],
    spectrum_db: &[f32; SPECTRUM_LEN],
    sample_rate: u32,
    fundamental_hz: f32,
) -> Features {
    Features {
        rms: rms(time_window),
        zcr: zero_crossing_rate(time_window),
        spectral_flatness: spectral_flatness(spectrum_db, sample_rate),
        harmonic_present: harmonic_presence(spectrum_db, sample_rate, fundamental_hz),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_frontend::{AudioFrontEnd, FFT_SIZE};

    fn spectrum_for_sine(freq: f32, sample_rate: u32) -> [f32; SPECTRUM_LEN] {
        let mut front_end = AudioFrontEnd::new(sample_rate);
        front_end.start();
        let sine: Vec<f32> = (0..FFT_SIZE)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect();
        front_end.push_samples(&sine);
        *front_end.magnitude_spectrum_db()
    }

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0; 1000]), 0.0);
    }

    #[test]
    fn rms_of_unit_sine_is_about_one_over_sqrt_two() {
        let sine: Vec<f32> = (0..48_000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 48_000.0).sin())
            .collect();
        let value = rms(&sine);
        assert!((value - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01, "got {value}");
    }

    #[test]
    fn zcr_of_low_frequency_sine_is_low() {
        let sine: Vec<f32> = (0..4096)
            .map(|i| (2.0 * std::f32::consts::PI * 110.0 * i as f32 / 48_000.0).sin())
            .collect();
        assert!(zero_crossing_rate(&sine) < 0.05);
    }

    #[test]
    fn zcr_of_alternating_signal_is_near_one() {
        let alternating: Vec<f32> = (0..4096).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!(zero_crossing_rate(&alternating) > 0.95);
    }

    #[test]
    fn flatness_is_low_for_pure_tone_in_band() {
        let spectrum = spectrum_for_sine(440.0, 48_000);
        let flatness = spectral_flatness(&spectrum, 48_000);
        assert!(flatness < 0.3, "got {flatness}");
    }

    #[test]
    fn flatness_is_noise_default_when_band_empty() {
        // A silent spectrum has no meaningful in-band power anywhere.
        let silent = [f32::NEG_INFINITY; SPECTRUM_LEN];
        assert_eq!(spectral_flatness(&silent, 48_000), 1.0);
    }

    #[test]
    fn harmonic_presence_true_for_rich_tone() {
        let sample_rate = 48_000;
        let mut front_end = AudioFrontEnd::new(sample_rate);
        front_end.start();
        let fundamental = 220.0f32;
        let rich: Vec<f32> = (0..FFT_SIZE)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * fundamental * t).sin()
                    + 0.5 * (2.0 * std::f32::consts::PI * fundamental * 2.0 * t).sin()
            })
            .collect();
        front_end.push_samples(&rich);
        let spectrum = *front_end.magnitude_spectrum_db();
        assert!(harmonic_presence(&spectrum, sample_rate, fundamental));
    }

    #[test]
    fn harmonic_presence_false_for_silence() {
        let silent = [f32::NEG_INFINITY; SPECTRUM_LEN];
        assert!(!harmonic_presence(&silent, 48_000, 220.0));
    }
}
