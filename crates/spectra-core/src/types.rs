//! Core types for spectral analysis
//!
//! Samples handled by this crate are real-valued amplitudes captured at a
//! known sample rate. Spectra are one-sided: bin 0 is DC and the last bin
//! sits at the Nyquist frequency.
//!
//! ```text
//!   power (dB)
//!      ^
//!      |        |
//!      |        |            |
//!      |~~~~~~~~|~~~~~~~~~~~~|~~~~~~~~  noise floor
//!      +--------+------------+--------> f
//!      0       f1           f2     fs/2
//! ```

/// A single real-valued sample
pub type Sample = f64;

/// A buffer of real-valued samples
pub type SampleBuffer = Vec<Sample>;

/// Guard added to normalized magnitudes before taking a logarithm
pub const AMPLITUDE_EPSILON: f64 = 1e-12;

/// Guard added to linear power values before taking a logarithm
pub const POWER_EPSILON: f64 = 1e-20;

/// Sample rate assumed when the caller does not declare one (1 MSps)
pub const DEFAULT_SAMPLE_RATE: f64 = 1_000_000.0;

/// Transform sizes accepted by the analysis front ends
pub const SUPPORTED_FFT_SIZES: [usize; 4] = [512, 1024, 2048, 4096];

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur during analysis
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Empty input: no samples to analyze")]
    EmptyInput,

    #[error("Non-numeric value {value:?} on line {line}")]
    NonNumeric { line: usize, value: String },

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Anomaly model initialization failed: {0}")]
    ModelInitialization(String),

    #[error("Computation failed: {0}")]
    Computation(String),
}

impl AnalysisError {
    /// True for failures caused by the caller's input rather than the engine
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::EmptyInput
                | AnalysisError::NonNumeric { .. }
                | AnalysisError::BufferTooShort { .. }
                | AnalysisError::InvalidParameter(_)
        )
    }
}

/// Convert linear power to dB with the power-domain guard
#[inline]
pub fn power_to_db(power: f64) -> f64 {
    10.0 * (power + POWER_EPSILON).log10()
}

/// Convert a normalized magnitude to dB with the amplitude-domain guard
#[inline]
pub fn magnitude_to_db(magnitude: f64) -> f64 {
    20.0 * (magnitude + AMPLITUDE_EPSILON).log10()
}

/// Reject NaN and infinite samples; the reported position is 1-based
pub fn check_finite(samples: &[f64]) -> AnalysisResult<()> {
    match samples.iter().position(|s| !s.is_finite()) {
        Some(idx) => Err(AnalysisError::NonNumeric {
            line: idx + 1,
            value: samples[idx].to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_class() {
        assert!(AnalysisError::EmptyInput.is_input_error());
        assert!(AnalysisError::BufferTooShort { expected: 2, actual: 1 }.is_input_error());
        assert!(!AnalysisError::ModelInitialization("seed".into()).is_input_error());
        assert!(!AnalysisError::Computation("nan".into()).is_input_error());
    }

    #[test]
    fn test_db_guards_are_finite() {
        assert!(power_to_db(0.0).is_finite());
        assert!((power_to_db(0.0) + 200.0).abs() < 1e-9);
        assert!((magnitude_to_db(0.0) + 240.0).abs() < 1e-9);
        assert!((magnitude_to_db(1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::NonNumeric {
            line: 3,
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "Non-numeric value \"abc\" on line 3");
    }

    #[test]
    fn test_check_finite() {
        assert_eq!(check_finite(&[0.0, -1.5, 1e300]), Ok(()));
        assert_eq!(
            check_finite(&[0.0, f64::NAN, 1.0]),
            Err(AnalysisError::NonNumeric {
                line: 2,
                value: "NaN".to_string()
            })
        );
        assert_eq!(
            check_finite(&[f64::NEG_INFINITY]),
            Err(AnalysisError::NonNumeric {
                line: 1,
                value: "-inf".to_string()
            })
        );
    }
}
