//! Spectrum Analysis
//!
//! One-sided FFT magnitude spectrum with windowing.
//!
//! The window is generated for the *whole* input buffer and applied before the
//! buffer is cut down to the transform size. For buffers longer than the
//! transform this means only the leading part of the taper is used.

use crate::fft_utils::FftProcessor;
use crate::types::{check_finite, magnitude_to_db, AnalysisError, AnalysisResult, AMPLITUDE_EPSILON};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window functions for spectral analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    /// No windowing (rectangular)
    #[serde(alias = "rect", alias = "none")]
    Rectangular,
    /// Hann window (default) - good general purpose
    #[default]
    #[serde(alias = "hanning")]
    Hann,
    /// Hamming window - slightly less sidelobe suppression than Hann
    Hamming,
    /// Blackman window - excellent sidelobe suppression
    Blackman,
}

impl WindowFunction {
    /// Generate symmetric window coefficients for the given size
    pub fn generate(&self, size: usize) -> Vec<f64> {
        if size == 0 {
            return Vec::new();
        }
        if size == 1 {
            return vec![1.0];
        }

        let m = (size - 1) as f64;
        match self {
            WindowFunction::Rectangular => vec![1.0; size],
            WindowFunction::Hann => (0..size)
                .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / m).cos())
                .collect(),
            WindowFunction::Hamming => (0..size)
                .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / m).cos())
                .collect(),
            WindowFunction::Blackman => (0..size)
                .map(|i| {
                    let n = i as f64 / m;
                    0.42 - 0.5 * (2.0 * PI * n).cos() + 0.08 * (4.0 * PI * n).cos()
                })
                .collect(),
        }
    }

    /// Parse window function from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "rectangular" | "rect" => Some(WindowFunction::Rectangular),
            "hann" | "hanning" => Some(WindowFunction::Hann),
            "hamming" => Some(WindowFunction::Hamming),
            "blackman" => Some(WindowFunction::Blackman),
            _ => None,
        }
    }

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            WindowFunction::Rectangular => "rect",
            WindowFunction::Hann => "hann",
            WindowFunction::Hamming => "hamming",
            WindowFunction::Blackman => "blackman",
        }
    }
}

/// One-sided power spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSpectrum {
    /// Bin frequencies in Hz, from 0 to sample_rate/2
    pub frequencies: Vec<f64>,
    /// Power per bin in dB: `20·log10(|X|/N + ε)`
    pub power_db: Vec<f64>,
    /// Normalized magnitude per bin: `|X|/N`
    #[serde(skip)]
    pub magnitude: Vec<f64>,
    /// Transform size actually used
    pub fft_size: usize,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Frequency resolution in Hz
    pub freq_resolution: f64,
    /// Window applied before the transform
    pub window: WindowFunction,
}

impl PowerSpectrum {
    /// Number of bins
    pub fn len(&self) -> usize {
        self.power_db.len()
    }

    /// True if the spectrum has no bins
    pub fn is_empty(&self) -> bool {
        self.power_db.is_empty()
    }

    /// Linear power per bin: `(|X|/N)²`.
    ///
    /// Recovered from `power_db` when the magnitudes were not carried along
    /// (e.g. a spectrum read back from JSON).
    pub fn linear_power(&self) -> Vec<f64> {
        if self.magnitude.len() == self.power_db.len() {
            self.magnitude.iter().map(|m| m * m).collect()
        } else {
            self.power_db
                .iter()
                .map(|&db| (10f64.powf(db / 20.0) - AMPLITUDE_EPSILON).max(0.0).powi(2))
                .collect()
        }
    }

    /// Get the peak frequency and power
    pub fn find_peak(&self) -> (f64, f64) {
        let mut max_idx = 0;
        let mut max_power = f64::NEG_INFINITY;

        for (i, &power) in self.power_db.iter().enumerate() {
            if power > max_power {
                max_power = power;
                max_idx = i;
            }
        }

        (self.frequencies[max_idx], max_power)
    }

    /// Format spectrum as text table
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Spectrum Analysis (FFT size: {}, window: {})\n",
            self.fft_size,
            self.window.name()
        ));
        output.push_str(&format!(
            "Sample rate: {:.0} Hz, Resolution: {:.2} Hz\n",
            self.sample_rate, self.freq_resolution
        ));
        output.push_str("─".repeat(50).as_str());
        output.push('\n');
        output.push_str("  Frequency (Hz)    Power (dB)\n");
        output.push_str("─".repeat(50).as_str());
        output.push('\n');

        // Show top 20 bins by power
        let mut indices: Vec<usize> = (0..self.power_db.len()).collect();
        indices.sort_by(|&a, &b| self.power_db[b].total_cmp(&self.power_db[a]));

        for &i in indices.iter().take(20) {
            output.push_str(&format!(
                "{:>14.2}    {:>10.2}\n",
                self.frequencies[i], self.power_db[i]
            ));
        }

        output
    }

    /// Format spectrum as CSV
    pub fn to_csv(&self) -> String {
        let mut output = String::from("frequency_hz,power_db\n");
        for (freq, power) in self.frequencies.iter().zip(self.power_db.iter()) {
            output.push_str(&format!("{},{}\n", freq, power));
        }
        output
    }

    /// Format spectrum as ASCII art
    pub fn to_ascii(&self, width: usize, height: usize) -> String {
        let mut output = String::new();
        let n = self.power_db.len();
        if n == 0 || width == 0 || height == 0 {
            return output;
        }

        let max_power = self
            .power_db
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let min_power = (max_power - 60.0).max(
            self.power_db
                .iter()
                .cloned()
                .fold(f64::INFINITY, f64::min),
        );
        let power_range = (max_power - min_power).max(1e-9);

        // Bin the spectrum to fit width
        let bins_per_col = (n / width).max(1);
        let columns = width.min(n);
        let mut binned: Vec<f64> = Vec::with_capacity(columns);
        for col in 0..columns {
            let start = col * bins_per_col;
            let end = ((col + 1) * bins_per_col).min(n);
            let max_in_bin = self.power_db[start..end]
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            binned.push(max_in_bin);
        }

        let chars = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
        for row in 0..height {
            let threshold = max_power - (row as f64 + 1.0) * power_range / height as f64;
            for &power in &binned {
                if power >= threshold {
                    let frac = (power - threshold) / (power_range / height as f64);
                    let char_idx = ((frac * 8.0) as usize).min(7);
                    output.push(chars[char_idx]);
                } else {
                    output.push(' ');
                }
            }
            output.push('\n');
        }

        output.push_str(&"─".repeat(columns));
        output.push('\n');

        let min_freq = self.frequencies.first().unwrap_or(&0.0);
        let max_freq = self.frequencies.last().unwrap_or(&0.0);
        output.push_str(&format!(
            "{:<width$}{:^width$}{:>width$}\n",
            format!("{:.0}", min_freq),
            format!("{:.0} Hz", (min_freq + max_freq) / 2.0),
            format!("{:.0}", max_freq),
            width = columns / 3
        ));

        output
    }
}

/// Spectrum analyzer with configurable FFT size and windowing
#[derive(Debug, Clone, Copy)]
pub struct SpectrumAnalyzer {
    fft_size: usize,
    window: WindowFunction,
}

impl SpectrumAnalyzer {
    /// Create a new spectrum analyzer with the given FFT size (Hann window)
    pub fn new(fft_size: usize) -> Self {
        Self::with_window(fft_size, WindowFunction::Hann)
    }

    /// Create a new spectrum analyzer with custom window function
    pub fn with_window(fft_size: usize, window: WindowFunction) -> Self {
        Self { fft_size, window }
    }

    /// Get the requested FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get the window function
    pub fn window(&self) -> WindowFunction {
        self.window
    }

    /// Compute the one-sided power spectrum of a real signal.
    ///
    /// The transform size is `min(fft_size, samples.len())`.
    pub fn compute(&self, samples: &[f64], sample_rate: f64) -> AnalysisResult<PowerSpectrum> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        check_finite(samples)?;
        if self.fft_size == 0 {
            return Err(AnalysisError::InvalidParameter(
                "FFT size must be positive".to_string(),
            ));
        }
        if sample_rate <= 0.0 || !sample_rate.is_finite() {
            return Err(AnalysisError::InvalidParameter(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }

        let coeffs = self.window.generate(samples.len());
        let n = self.fft_size.min(samples.len());
        let windowed: Vec<f64> = samples
            .iter()
            .zip(coeffs.iter())
            .take(n)
            .map(|(&s, &w)| s * w)
            .collect();

        let mut processor = FftProcessor::new(n);
        let magnitude: Vec<f64> = processor
            .rfft_magnitude(&windowed)
            .into_iter()
            .map(|m| m / n as f64)
            .collect();
        let power_db: Vec<f64> = magnitude.iter().map(|&m| magnitude_to_db(m)).collect();

        Ok(PowerSpectrum {
            frequencies: FftProcessor::rfft_frequencies(n, sample_rate),
            power_db,
            magnitude,
            fft_size: n,
            sample_rate,
            freq_resolution: sample_rate / n as f64,
            window: self.window,
        })
    }
}

/// Compute the power spectrum of `samples` in one call
pub fn compute_spectrum(
    samples: &[f64],
    sample_rate: f64,
    window: WindowFunction,
    transform_size: usize,
) -> AnalysisResult<PowerSpectrum> {
    SpectrumAnalyzer::with_window(transform_size, window).compute(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SUPPORTED_FFT_SIZES;

    fn tone(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).cos())
            .collect()
    }

    #[test]
    fn test_window_generation() {
        let size = 65;

        // Symmetric Hann is 0 at both edges and 1 at center
        let hann = WindowFunction::Hann.generate(size);
        assert!(hann[0].abs() < 1e-12);
        assert!(hann[size - 1].abs() < 1e-12);
        assert!((hann[size / 2] - 1.0).abs() < 1e-12);

        // Hamming should be 0.08 at edges
        let hamming = WindowFunction::Hamming.generate(size);
        assert!((hamming[0] - 0.08).abs() < 1e-12);

        let blackman = WindowFunction::Blackman.generate(size);
        assert!(blackman[0].abs() < 1e-12);
        assert!((blackman[size / 2] - 1.0).abs() < 1e-12);

        assert_eq!(WindowFunction::Rectangular.generate(4), vec![1.0; 4]);
        assert_eq!(WindowFunction::Hann.generate(1), vec![1.0]);
    }

    #[test]
    fn test_output_length_for_supported_sizes() {
        let samples = tone(1000.0, 1e6, 10_000);
        for &n in &SUPPORTED_FFT_SIZES {
            let spectrum = compute_spectrum(&samples, 1e6, WindowFunction::Hann, n).unwrap();
            assert_eq!(spectrum.len(), n / 2 + 1);
            assert_eq!(spectrum.frequencies.len(), n / 2 + 1);
        }
    }

    #[test]
    fn test_short_buffer_uses_buffer_length() {
        let samples = vec![0.5; 300];
        let spectrum = compute_spectrum(&samples, 1e6, WindowFunction::Hann, 2048).unwrap();
        assert_eq!(spectrum.fft_size, 300);
        assert_eq!(spectrum.len(), 151);
    }

    #[test]
    fn test_frequency_axis() {
        let sample_rate = 1e6;
        let samples = tone(5000.0, sample_rate, 4096);
        let spectrum = compute_spectrum(&samples, sample_rate, WindowFunction::Hann, 1024).unwrap();

        assert_eq!(spectrum.frequencies[0], 0.0);
        assert!((spectrum.frequencies.last().unwrap() - sample_rate / 2.0).abs() < 1e-6);
        assert!(spectrum.frequencies.windows(2).all(|w| w[1] > w[0]));
        assert!((spectrum.freq_resolution - sample_rate / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn test_spectrum_single_tone() {
        let sample_rate = 1e6;
        let freq = 100_000.0;
        let samples = tone(freq, sample_rate, 10_000);

        let spectrum = compute_spectrum(&samples, sample_rate, WindowFunction::Hann, 2048).unwrap();

        let (peak_freq, _) = spectrum.find_peak();
        assert!(
            (peak_freq - freq).abs() <= spectrum.freq_resolution,
            "Peak at {} Hz, expected {} Hz",
            peak_freq,
            freq
        );
    }

    #[test]
    fn test_window_applied_before_truncation() {
        // A Hann window spanning the whole buffer leaves the first transform
        // block with a rising taper only, so its DC bin differs from one
        // windowed on the block itself.
        let samples = vec![1.0; 4096];
        let long = compute_spectrum(&samples, 1e6, WindowFunction::Hann, 512).unwrap();
        let short = compute_spectrum(&samples[..512], 1e6, WindowFunction::Hann, 512).unwrap();
        assert!((long.magnitude[0] - short.magnitude[0]).abs() > 1e-3);
    }

    #[test]
    fn test_zero_signal_is_finite() {
        let spectrum = compute_spectrum(&vec![0.0; 2048], 1e6, WindowFunction::Hann, 2048).unwrap();
        assert!(spectrum.power_db.iter().all(|p| p.is_finite()));
        assert!((spectrum.power_db[0] + 240.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_samples_rejected() {
        let mut samples = tone(1000.0, 1e6, 4096);
        samples[100] = f64::NAN;
        let err = compute_spectrum(&samples, 1e6, WindowFunction::Hann, 1024).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NonNumeric {
                line: 101,
                value: "NaN".to_string()
            }
        );

        // Outside the transformed block still poisons the window
        samples[100] = 0.0;
        samples[4000] = f64::INFINITY;
        let err = compute_spectrum(&samples, 1e6, WindowFunction::Hann, 1024).unwrap_err();
        assert!(matches!(err, AnalysisError::NonNumeric { line: 4001, .. }));
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = compute_spectrum(&[], 1e6, WindowFunction::Hann, 1024).unwrap_err();
        assert_eq!(err, AnalysisError::EmptyInput);
    }

    #[test]
    fn test_window_from_str() {
        assert_eq!(WindowFunction::from_str("hann"), Some(WindowFunction::Hann));
        assert_eq!(
            WindowFunction::from_str("HAMMING"),
            Some(WindowFunction::Hamming)
        );
        assert_eq!(
            WindowFunction::from_str("rect"),
            Some(WindowFunction::Rectangular)
        );
        assert_eq!(WindowFunction::from_str("invalid"), None);
    }
}
