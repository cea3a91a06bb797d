//! # Configuration System
//!
//! YAML-based configuration for spectrum analysis, including:
//!
//! - Spectrum settings (sample rate, window, transform size)
//! - Waterfall geometry
//! - Anomaly model parameters
//! - Live stream cadence and signal parameters
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `SPECTRA_CONFIG` environment variable
//! 2. `./spectra.yaml` (current directory)
//! 3. `~/.config/spectra/config.yaml` (user config)
//!
//! If none exists, defaults are used.
//!
//! ## Example Configuration
//!
//! ```yaml
//! spectrum:
//!   sample_rate: 1.0e6
//!   window: hann
//!   fft_size: 2048
//!
//! waterfall:
//!   enabled: true
//!   slice_size: 512
//!   n_slices: 40
//!
//! anomaly:
//!   n_slices: 30
//!   contamination: 0.08
//!   seed: 42
//! ```

use crate::analysis::spectrum::WindowFunction;
use crate::anomaly::isolation_forest::IsolationForestParams;
use crate::types::{DEFAULT_SAMPLE_RATE, SUPPORTED_FFT_SIZES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SPECTRA_CONFIG";

/// Error type for configuration operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("config not found: {0}")]
    NotFound(String),
    /// Failed to read configuration file
    #[error("failed to read config: {0}")]
    ReadError(String),
    /// Failed to parse configuration
    #[error("failed to parse config: {0}")]
    ParseError(String),
    /// Invalid configuration value
    #[error("invalid config: {0}")]
    ValidationError(String),
}

/// Spectrum engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Window applied before the transform
    pub window: WindowFunction,
    /// Transform size (512, 1024, 2048 or 4096)
    pub fft_size: usize,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            window: WindowFunction::Hann,
            fft_size: 2048,
        }
    }
}

/// Waterfall configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterfallConfig {
    /// Compute a waterfall alongside the spectrum
    pub enabled: bool,
    /// Samples per row
    pub slice_size: usize,
    /// Requested number of rows
    pub n_slices: usize,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            slice_size: 512,
            n_slices: 40,
        }
    }
}

/// Anomaly model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Partitions per spectrum fed to the model
    pub n_slices: usize,
    /// Trees in the forest
    pub n_estimators: usize,
    /// Sub-sample size per tree
    pub max_samples: usize,
    /// Expected outlier fraction of the reference population
    pub contamination: f64,
    /// Size of the synthetic reference population
    pub training_samples: usize,
    /// Seed for the reference population and the forest
    pub seed: u64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            n_slices: 30,
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.08,
            training_samples: 500,
            seed: 42,
        }
    }
}

impl AnomalyConfig {
    /// Forest hyper-parameters derived from this config
    pub fn forest_params(&self) -> IsolationForestParams {
        IsolationForestParams {
            n_estimators: self.n_estimators,
            max_samples: self.max_samples,
            contamination: self.contamination,
            seed: self.seed,
        }
    }
}

/// Live stream configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Publish interval in milliseconds
    pub interval_ms: u64,
    /// Carrier frequency in Hz
    pub carrier_freq: f64,
    /// Standard deviation of the additive noise
    pub noise_level: f64,
    /// Frame duration in seconds
    pub frame_duration: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            carrier_freq: 200_000.0,
            noise_level: 0.2,
            frame_duration: 0.01,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectraConfig {
    /// Spectrum engine
    pub spectrum: SpectrumConfig,
    /// Waterfall generator
    pub waterfall: WaterfallConfig,
    /// Anomaly model
    pub anomaly: AnomalyConfig,
    /// Live stream
    pub stream: StreamConfig,
}

impl SpectraConfig {
    /// Load from the standard search path, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        for path in Self::search_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load_from_file(&path);
            }
        }
        tracing::debug!("no configuration file found; using defaults");
        Ok(Self::default())
    }

    /// Load and validate a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Candidate config files, highest priority first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from("spectra.yaml"));
        if let Ok(home) = std::env::var("HOME") {
            paths.push(PathBuf::from(home).join(".config/spectra/config.yaml"));
        }
        paths
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spectrum.sample_rate <= 0.0 || !self.spectrum.sample_rate.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "spectrum.sample_rate must be positive, got {}",
                self.spectrum.sample_rate
            )));
        }
        if !SUPPORTED_FFT_SIZES.contains(&self.spectrum.fft_size) {
            return Err(ConfigError::ValidationError(format!(
                "spectrum.fft_size must be one of {:?}, got {}",
                SUPPORTED_FFT_SIZES, self.spectrum.fft_size
            )));
        }
        if self.waterfall.slice_size == 0 || self.waterfall.n_slices == 0 {
            return Err(ConfigError::ValidationError(
                "waterfall.slice_size and waterfall.n_slices must be positive".to_string(),
            ));
        }
        if self.anomaly.n_slices == 0 {
            return Err(ConfigError::ValidationError(
                "anomaly.n_slices must be positive".to_string(),
            ));
        }
        if !(self.anomaly.contamination > 0.0 && self.anomaly.contamination <= 0.5) {
            return Err(ConfigError::ValidationError(format!(
                "anomaly.contamination must be in (0, 0.5], got {}",
                self.anomaly.contamination
            )));
        }
        if self.anomaly.n_estimators == 0
            || self.anomaly.max_samples == 0
            || self.anomaly.training_samples == 0
        {
            return Err(ConfigError::ValidationError(
                "anomaly.n_estimators, max_samples and training_samples must be positive"
                    .to_string(),
            ));
        }
        if self.stream.frame_duration <= 0.0 || self.stream.noise_level < 0.0 {
            return Err(ConfigError::ValidationError(
                "stream.frame_duration must be positive and stream.noise_level non-negative"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SpectraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spectrum.sample_rate, 1_000_000.0);
        assert_eq!(config.spectrum.fft_size, 2048);
        assert_eq!(config.anomaly.n_slices, 30);
        assert_eq!(config.waterfall.n_slices, 40);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "spectrum:\n  window: blackman\n  fft_size: 4096\nanomaly:\n  seed: 7\n";
        let config = SpectraConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.spectrum.window, WindowFunction::Blackman);
        assert_eq!(config.spectrum.fft_size, 4096);
        assert_eq!(config.spectrum.sample_rate, 1_000_000.0);
        assert_eq!(config.anomaly.seed, 7);
        assert_eq!(config.anomaly.contamination, 0.08);
    }

    #[test]
    fn test_window_aliases() {
        let config = SpectraConfig::from_yaml("spectrum:\n  window: rect\n").unwrap();
        assert_eq!(config.spectrum.window, WindowFunction::Rectangular);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = SpectraConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(SpectraConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            SpectraConfig::from_yaml("spectrum:\n  fft_size: 1000\n"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            SpectraConfig::from_yaml("anomaly:\n  contamination: 0.9\n"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            SpectraConfig::from_yaml("spectrum:\n  sample_rate: -5\n"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            SpectraConfig::from_yaml("spectrum: [1, 2"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SpectraConfig::load_from_file(Path::new("/nonexistent/spectra.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
