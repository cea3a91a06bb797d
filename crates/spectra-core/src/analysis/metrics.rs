//! Signal Quality Metrics
//!
//! Peak, noise floor, SNR, occupied bandwidth and a coarse modulation class
//! derived from one power spectrum and the time-domain buffer it came from.
//!
//! ## Noise floor
//!
//! Linear bin powers are sorted ascending and the median of the lowest 70%
//! is taken before converting to dB. A handful of strong carriers cannot
//! move this estimate.
//!
//! ## Bandwidth
//!
//! `bandwidth(X dB)` is the distance between the *first* and *last* bins whose
//! power is within X dB of the peak, across the whole spectrum. Two separated
//! carriers of similar power therefore report the span between them, not the
//! width of either one.

use crate::analysis::modulation::{ModulationClass, ModulationClassifier, ModulationFeatures};
use crate::analysis::spectrum::PowerSpectrum;
use crate::types::{check_finite, power_to_db, AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

/// Fraction of sorted bins that feed the noise-floor median
pub const NOISE_FLOOR_FRACTION: f64 = 0.7;

/// Signal quality metrics for one spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMetrics {
    /// Frequency of the strongest bin in Hz
    pub peak_freq: f64,
    /// Power of the strongest bin in dB
    pub peak_power_db: f64,
    /// Estimated noise floor in dB
    pub noise_floor_db: f64,
    /// Peak power over noise floor in dB
    pub snr_db: f64,
    /// Span of bins within 3 dB of the peak, in Hz
    pub bandwidth_3db_hz: f64,
    /// Span of bins within 10 dB of the peak, in Hz
    pub bandwidth_10db_hz: f64,
    /// Envelope variation index used by the classifier
    pub envelope_variation: f64,
    /// Coarse modulation class
    pub modulation: ModulationClass,
}

impl SignalMetrics {
    /// Compute metrics with the default modulation rule table
    pub fn compute(spectrum: &PowerSpectrum, samples: &[f64]) -> AnalysisResult<Self> {
        Self::compute_with(spectrum, samples, &ModulationClassifier::default())
    }

    /// Compute metrics with a caller-supplied modulation rule table
    pub fn compute_with(
        spectrum: &PowerSpectrum,
        samples: &[f64],
        classifier: &ModulationClassifier,
    ) -> AnalysisResult<Self> {
        if spectrum.len() < 2 {
            return Err(AnalysisError::BufferTooShort {
                expected: 2,
                actual: spectrum.len(),
            });
        }
        check_finite(samples)?;
        if spectrum.power_db.iter().any(|p| !p.is_finite()) {
            return Err(AnalysisError::InvalidParameter(
                "spectrum contains non-finite power values".to_string(),
            ));
        }

        let power = spectrum.linear_power();
        let peak_idx = argmax(&power);
        let peak_power = power[peak_idx];
        let peak_power_db = power_to_db(peak_power);

        let noise_floor_db = power_to_db(noise_floor(&power));
        let snr_db = peak_power_db - noise_floor_db;

        let bandwidth_3db_hz = threshold_span(&power, &spectrum.frequencies, peak_power, 3.0);
        let bandwidth_10db_hz = threshold_span(&power, &spectrum.frequencies, peak_power, 10.0);

        let features = ModulationFeatures::from_signal(samples, snr_db);
        let modulation = classifier.classify(&features);

        Ok(Self {
            peak_freq: spectrum.frequencies[peak_idx],
            peak_power_db,
            noise_floor_db,
            snr_db,
            bandwidth_3db_hz,
            bandwidth_10db_hz,
            envelope_variation: features.envelope_variation,
            modulation,
        })
    }

    /// Format as text report
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str("Signal Metrics\n");
        output.push_str(&"═".repeat(50));
        output.push('\n');
        output.push_str(&format!("Peak Frequency:    {:.2} kHz\n", self.peak_freq / 1000.0));
        output.push_str(&format!("Peak Power:        {:.2} dB\n", self.peak_power_db));
        output.push_str(&format!("Noise Floor:       {:.2} dB\n", self.noise_floor_db));
        output.push_str(&format!("SNR:               {:.2} dB\n", self.snr_db));
        output.push_str(&format!(
            "Bandwidth -3 dB:   {:.2} kHz\n",
            self.bandwidth_3db_hz / 1000.0
        ));
        output.push_str(&format!(
            "Bandwidth -10 dB:  {:.2} kHz\n",
            self.bandwidth_10db_hz / 1000.0
        ));
        output.push_str(&format!("Envelope Index:    {:.3}\n", self.envelope_variation));
        output.push_str(&format!("Modulation:        {}\n", self.modulation));
        output
    }
}

/// Compute metrics for a spectrum and its source buffer
pub fn extract_metrics(spectrum: &PowerSpectrum, samples: &[f64]) -> AnalysisResult<SignalMetrics> {
    SignalMetrics::compute(spectrum, samples)
}

/// Index of the first maximum
fn argmax(values: &[f64]) -> usize {
    let mut max_idx = 0;
    let mut max_val = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > max_val {
            max_val = v;
            max_idx = i;
        }
    }
    max_idx
}

/// Median of the lowest 70% of linear powers
pub fn noise_floor(power: &[f64]) -> f64 {
    let mut sorted = power.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let count = ((NOISE_FLOOR_FRACTION * sorted.len() as f64) as usize).max(1).min(sorted.len());
    median(&sorted[..count])
}

/// Median of an ascending slice
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Distance between the first and last bins at or above `peak / 10^(db/10)`
pub fn threshold_span(power: &[f64], frequencies: &[f64], peak_power: f64, threshold_db: f64) -> f64 {
    let threshold = peak_power / 10f64.powf(threshold_db / 10.0);
    let first = power.iter().position(|&p| p >= threshold);
    let last = power.iter().rposition(|&p| p >= threshold);
    match (first, last) {
        (Some(lo), Some(hi)) if hi > lo => frequencies[hi] - frequencies[lo],
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::spectrum::{compute_spectrum, WindowFunction};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use std::f64::consts::PI;

    const FS: f64 = 1e6;

    fn tone(freq: f64, amplitude: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / FS).cos())
            .collect()
    }

    fn spectrum_from_power(power: Vec<f64>) -> PowerSpectrum {
        let n = power.len();
        PowerSpectrum {
            frequencies: (0..n).map(|i| i as f64 * 100.0).collect(),
            power_db: power.iter().map(|&p| 10.0 * (p + 1e-20).log10()).collect(),
            magnitude: power.iter().map(|p| p.sqrt()).collect(),
            fft_size: 2 * (n - 1),
            sample_rate: 200.0 * (n - 1) as f64,
            freq_resolution: 100.0,
            window: WindowFunction::Hann,
        }
    }

    #[test]
    fn test_pure_tone_peak_and_snr() {
        let f0 = 100_000.0;
        let samples = tone(f0, 1.0, 10_000);
        let spectrum = compute_spectrum(&samples, FS, WindowFunction::Hann, 2048).unwrap();
        let metrics = extract_metrics(&spectrum, &samples).unwrap();

        assert!(
            (metrics.peak_freq - f0).abs() <= FS / 2048.0,
            "peak at {} Hz",
            metrics.peak_freq
        );
        assert!(metrics.snr_db > 40.0, "SNR {} dB", metrics.snr_db);
    }

    #[test]
    fn test_noise_floor_uses_lowest_seventy_percent() {
        // 10 bins: 7 lowest are 1..=7, median of those is 4
        let mut power: Vec<f64> = (1..=7).map(|v| v as f64).collect();
        power.extend([1e6, 2e6, 3e6]);
        assert!((noise_floor(&power) - 4.0).abs() < 1e-12);

        // Even count takes the mean of the middle pair: floor(0.7 * 6) = 4 → (2 + 3) / 2
        let power = vec![4.0, 1.0, 3.0, 2.0, 100.0, 200.0];
        assert!((noise_floor(&power) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_bandwidth_spans_first_to_last_bin() {
        // Two equal carriers far apart: the -3 dB span covers both, even
        // though the bins between them are at the noise floor.
        let mut power = vec![1e-6; 100];
        power[20] = 1.0;
        power[80] = 0.9;
        let spectrum = spectrum_from_power(power);
        let metrics = extract_metrics(&spectrum, &[1.0; 16]).unwrap();

        assert_eq!(metrics.peak_freq, 2000.0);
        assert!((metrics.bandwidth_3db_hz - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_bandwidth_single_bin_is_zero() {
        let mut power = vec![1e-6; 50];
        power[10] = 1.0;
        let spectrum = spectrum_from_power(power);
        let metrics = extract_metrics(&spectrum, &[1.0; 16]).unwrap();
        assert_eq!(metrics.bandwidth_3db_hz, 0.0);
    }

    #[test]
    fn test_wider_threshold_never_narrower() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Normal::new(0.0, 1.0).unwrap();

        for trial in 0..20 {
            let samples: Vec<f64> = tone(50_000.0 + trial as f64 * 10_000.0, 1.0, 4096)
                .into_iter()
                .map(|s| s + 0.3 * normal.sample(&mut rng))
                .collect();
            let spectrum = compute_spectrum(&samples, FS, WindowFunction::Hann, 1024).unwrap();
            let metrics = extract_metrics(&spectrum, &samples).unwrap();
            assert!(
                metrics.bandwidth_10db_hz >= metrics.bandwidth_3db_hz,
                "trial {}: {} < {}",
                trial,
                metrics.bandwidth_10db_hz,
                metrics.bandwidth_3db_hz
            );
        }
    }

    #[test]
    fn test_two_tone_is_am() {
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let samples: Vec<f64> = (0..10_000)
            .map(|i| {
                let t = i as f64 / FS;
                (2.0 * PI * 200e3 * t).cos()
                    + 0.4 * (2.0 * PI * 350e3 * t).cos()
                    + 0.01 * normal.sample(&mut rng)
            })
            .collect();
        let spectrum = compute_spectrum(&samples, FS, WindowFunction::Hann, 2048).unwrap();
        let metrics = extract_metrics(&spectrum, &samples).unwrap();
        assert!(metrics.envelope_variation > 0.3);
        assert_eq!(metrics.modulation, ModulationClass::Am);
    }

    #[test]
    fn test_zero_signal_is_finite() {
        let samples = vec![0.0; 2048];
        let spectrum = compute_spectrum(&samples, FS, WindowFunction::Hann, 2048).unwrap();
        let metrics = extract_metrics(&spectrum, &samples).unwrap();

        assert!(metrics.noise_floor_db.is_finite());
        assert!(metrics.snr_db.is_finite());
        assert!(metrics.peak_power_db.is_finite());
        assert!(metrics.bandwidth_3db_hz.is_finite());
        assert_eq!(metrics.modulation, ModulationClass::CwNoise);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let samples = vec![0.5; 2048];
        let mut spectrum = compute_spectrum(&samples, FS, WindowFunction::Hann, 2048).unwrap();

        let mut bad = samples.clone();
        bad[3] = f64::NAN;
        assert!(matches!(
            extract_metrics(&spectrum, &bad),
            Err(AnalysisError::NonNumeric { line: 4, .. })
        ));

        spectrum.power_db[10] = f64::NAN;
        assert!(matches!(
            extract_metrics(&spectrum, &samples),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_single_bin_spectrum_rejected() {
        let spectrum = compute_spectrum(&[1.0], FS, WindowFunction::Hann, 2048).unwrap();
        let err = extract_metrics(&spectrum, &[1.0]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::BufferTooShort {
                expected: 2,
                actual: 1
            }
        );
    }
}
