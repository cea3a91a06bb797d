//! Waterfall/Spectrogram Generation
//!
//! Splits a long buffer into `n_slices` evenly spaced, non-overlapping start
//! points and transforms a `slice_size` chunk at each one. Chunks that would
//! run past the end of the buffer end the scan.
//!
//! Rows are `20·log10(|X| + ε)` without the `1/N` normalization used by the
//! single-shot spectrum.

use crate::analysis::spectrum::WindowFunction;
use crate::fft_utils::FftProcessor;
use crate::types::{check_finite, magnitude_to_db, AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

/// Default chunk length per waterfall row
pub const DEFAULT_SLICE_SIZE: usize = 512;

/// Default number of rows requested
pub const DEFAULT_WATERFALL_SLICES: usize = 40;

/// Time × frequency magnitude matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waterfall {
    /// Frequency axis shared by every row, in Hz
    pub frequencies: Vec<f64>,
    /// One magnitude-dB spectrum per retained slice
    pub rows: Vec<Vec<f64>>,
    /// Start time of each row in seconds
    pub times: Vec<f64>,
    /// Samples per slice
    pub slice_size: usize,
    /// Distance between slice starts in samples
    pub step: usize,
    /// Sample rate in Hz
    pub sample_rate: f64,
}

impl Waterfall {
    /// Number of retained rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Get the min/max power range (excluding the ε floor)
    pub fn power_range(&self) -> (f64, f64) {
        let floor = magnitude_to_db(0.0) + 1.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for row in &self.rows {
            for &val in row {
                if val > max {
                    max = val;
                }
                if val < min && val > floor {
                    min = val;
                }
            }
        }
        (min, max)
    }

    /// Generate ASCII art waterfall for terminal display
    pub fn to_ascii(&self, width: usize, height: usize) -> String {
        let (auto_min, auto_max) = self.power_range();
        self.to_ascii_with_range(width, height, auto_min, auto_max)
    }

    /// Generate ASCII art with specified dB range
    pub fn to_ascii_with_range(
        &self,
        width: usize,
        height: usize,
        min_db: f64,
        max_db: f64,
    ) -> String {
        let mut output = String::new();
        let range = (max_db - min_db).max(1e-9);

        // Unicode block characters for grayscale
        let chars = [' ', '░', '▒', '▓', '█'];
        let num_chars = chars.len();

        let time_bins = self.rows.len();
        let freq_bins = self.frequencies.len();
        if time_bins == 0 || freq_bins == 0 || width == 0 || height == 0 {
            output.push_str("Waterfall: no complete slices\n");
            return output;
        }
        let rows_per_char = (time_bins + height - 1) / height;
        let cols_per_char = (freq_bins + width - 1) / width;

        output.push_str(&format!(
            "Waterfall: {}x{} bins, {:.0} Hz to {:.0} Hz\n",
            freq_bins,
            time_bins,
            self.frequencies.first().unwrap_or(&0.0),
            self.frequencies.last().unwrap_or(&0.0)
        ));
        output.push_str(&format!(
            "Time: {:.6}s to {:.6}s\n",
            self.times.first().unwrap_or(&0.0),
            self.times.last().unwrap_or(&0.0)
        ));
        output.push_str(&"─".repeat(width));
        output.push('\n');

        for row_idx in 0..height {
            let time_start = row_idx * rows_per_char;
            let time_end = ((row_idx + 1) * rows_per_char).min(time_bins);
            if time_start >= time_bins {
                break;
            }

            for col_idx in 0..width {
                let freq_start = col_idx * cols_per_char;
                let freq_end = ((col_idx + 1) * cols_per_char).min(freq_bins);
                if freq_start >= freq_bins {
                    break;
                }

                // Max power in this cell
                let mut max_power = f64::NEG_INFINITY;
                for row in &self.rows[time_start..time_end] {
                    for &p in &row[freq_start..freq_end] {
                        max_power = max_power.max(p);
                    }
                }

                let normalized = ((max_power - min_db) / range).clamp(0.0, 1.0);
                let char_idx = ((normalized * (num_chars - 1) as f64) as usize).min(num_chars - 1);
                output.push(chars[char_idx]);
            }
            output.push('\n');
        }

        output.push_str(&"─".repeat(width));
        output.push('\n');
        output
    }
}

/// Waterfall spectrogram generator
#[derive(Debug, Clone)]
pub struct WaterfallGenerator {
    slice_size: usize,
    n_slices: usize,
    window_coeffs: Vec<f64>,
}

impl Default for WaterfallGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SLICE_SIZE, DEFAULT_WATERFALL_SLICES)
    }
}

impl WaterfallGenerator {
    /// Create a new waterfall generator (Hann-windowed rows)
    pub fn new(slice_size: usize, n_slices: usize) -> Self {
        Self {
            slice_size,
            n_slices,
            window_coeffs: WindowFunction::Hann.generate(slice_size),
        }
    }

    /// Samples per slice
    pub fn slice_size(&self) -> usize {
        self.slice_size
    }

    /// Requested number of slices
    pub fn n_slices(&self) -> usize {
        self.n_slices
    }

    /// Compute the waterfall matrix
    pub fn compute(&self, samples: &[f64], sample_rate: f64) -> AnalysisResult<Waterfall> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        check_finite(samples)?;
        if self.slice_size == 0 || self.n_slices == 0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "waterfall needs a positive slice size and slice count, got {}x{}",
                self.slice_size, self.n_slices
            )));
        }

        let step = (samples.len() / self.n_slices).max(1);
        let mut processor = FftProcessor::new(self.slice_size);
        let mut rows = Vec::with_capacity(self.n_slices);
        let mut times = Vec::with_capacity(self.n_slices);

        for i in 0..self.n_slices {
            let start = i * step;
            let end = start + self.slice_size;
            if end > samples.len() {
                break;
            }

            let frame: Vec<f64> = samples[start..end]
                .iter()
                .zip(self.window_coeffs.iter())
                .map(|(&s, &w)| s * w)
                .collect();

            let row: Vec<f64> = processor
                .rfft_magnitude(&frame)
                .into_iter()
                .map(magnitude_to_db)
                .collect();

            rows.push(row);
            times.push(start as f64 / sample_rate);
        }

        if rows.is_empty() {
            tracing::warn!(
                samples = samples.len(),
                slice_size = self.slice_size,
                "buffer shorter than one waterfall slice; no rows produced"
            );
        }

        Ok(Waterfall {
            frequencies: FftProcessor::rfft_frequencies(self.slice_size, sample_rate),
            rows,
            times,
            slice_size: self.slice_size,
            step,
            sample_rate,
        })
    }
}

/// Compute a waterfall in one call
pub fn compute_waterfall(
    samples: &[f64],
    sample_rate: f64,
    slice_size: usize,
    n_slices: usize,
) -> AnalysisResult<Waterfall> {
    WaterfallGenerator::new(slice_size, n_slices).compute(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).cos())
            .collect()
    }

    #[test]
    fn test_waterfall_dimensions() {
        let samples = tone(100_000.0, 1e6, 10_000);
        let wf = compute_waterfall(&samples, 1e6, 512, 40).unwrap();

        // step = 250, last start = 39 * 250 = 9750 → 9750 + 512 > 10000
        assert_eq!(wf.step, 250);
        assert_eq!(wf.frequencies.len(), 257);
        assert!(wf.rows.iter().all(|r| r.len() == 257));
        let expected_rows = (0..40).filter(|i| i * 250 + 512 <= 10_000).count();
        assert_eq!(wf.num_rows(), expected_rows);
        assert_eq!(wf.num_rows(), 38);
    }

    #[test]
    fn test_waterfall_stops_at_first_short_chunk() {
        let samples = vec![1.0; 600];
        let wf = compute_waterfall(&samples, 1e6, 512, 40).unwrap();
        // step = 15; starts 0..=88 fit (88 + 512 = 600)
        assert_eq!(wf.step, 15);
        assert_eq!(wf.num_rows(), 6);
    }

    #[test]
    fn test_waterfall_short_buffer_has_no_rows() {
        let samples = vec![1.0; 100];
        let wf = compute_waterfall(&samples, 1e6, 512, 40).unwrap();
        assert_eq!(wf.num_rows(), 0);
        assert_eq!(wf.frequencies.len(), 257);
    }

    #[test]
    fn test_waterfall_tone_row_peak() {
        let sample_rate = 1e6;
        let samples = tone(125_000.0, sample_rate, 8192);
        let wf = compute_waterfall(&samples, sample_rate, 512, 8).unwrap();

        for row in &wf.rows {
            let peak = row
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap();
            assert!((wf.frequencies[peak] - 125_000.0).abs() <= sample_rate / 512.0);
        }
    }

    #[test]
    fn test_waterfall_unnormalized_magnitude() {
        // Hann-windowed DC of length 512 sums to 255.5
        let wf = compute_waterfall(&vec![1.0; 512], 1e6, 512, 1).unwrap();
        let expected = 20.0 * (255.5f64 + 1e-12).log10();
        assert!((wf.rows[0][0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_waterfall_rejects_non_finite() {
        let mut samples = tone(100_000.0, 1e6, 2048);
        samples[7] = f64::NEG_INFINITY;
        let err = compute_waterfall(&samples, 1e6, 512, 4).unwrap_err();
        assert!(matches!(err, AnalysisError::NonNumeric { line: 8, .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_ascii_render() {
        let samples = tone(200_000.0, 1e6, 10_000);
        let wf = compute_waterfall(&samples, 1e6, 512, 40).unwrap();
        let ascii = wf.to_ascii(60, 10);
        assert!(ascii.starts_with("Waterfall: 257x38 bins"));
    }
}
