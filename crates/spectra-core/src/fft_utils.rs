//! FFT Utilities for Real-Valued Signals
//!
//! Thin wrapper around `rustfft` that plans a forward transform once and
//! reuses it. Real input is promoted to complex, transformed, and only the
//! non-negative half of the spectrum is kept.
//!
//! ```text
//! x[0..N] (real) → X[0..N] (complex) → |X[0..=N/2]|   (one-sided)
//!                                        bin k ↔ k·fs/N Hz
//! ```

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

/// Forward FFT processor for a fixed transform size
pub struct FftProcessor {
    size: usize,
    fft_forward: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl fmt::Debug for FftProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftProcessor")
            .field("size", &self.size)
            .finish()
    }
}

impl FftProcessor {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(size);
        let scratch = vec![Complex64::new(0.0, 0.0); fft_forward.get_inplace_scratch_len()];

        Self {
            size,
            fft_forward,
            scratch,
        }
    }

    /// Get the FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Compute the forward FFT in-place
    pub fn fft_inplace(&mut self, buffer: &mut [Complex64]) {
        assert_eq!(buffer.len(), self.size);
        self.fft_forward.process_with_scratch(buffer, &mut self.scratch);
    }

    /// Transform a real buffer and return the one-sided complex spectrum.
    ///
    /// The input is zero-padded or truncated to the processor size.
    pub fn rfft(&mut self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex64::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));
        self.fft_inplace(&mut buffer);
        buffer.truncate(self.size / 2 + 1);
        buffer
    }

    /// One-sided magnitude spectrum `|X[k]|`
    pub fn rfft_magnitude(&mut self, input: &[f64]) -> Vec<f64> {
        self.rfft(input).iter().map(|c| c.norm()).collect()
    }

    /// Frequencies of the one-sided bins for a transform of `size` points
    pub fn rfft_frequencies(size: usize, sample_rate: f64) -> Vec<f64> {
        let resolution = sample_rate / size as f64;
        (0..=size / 2).map(|k| k as f64 * resolution).collect()
    }
}
