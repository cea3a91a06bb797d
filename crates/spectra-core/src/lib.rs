//! # Spectra Core
//!
//! Spectral feature extraction and anomaly scoring for real-valued sampled
//! signals.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                    │
//! │                 (spectra-cli, custom)                   │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │              SpectrumPipeline (pipeline.rs)             │
//! └─────────────────────────────────────────────────────────┘
//!         │              │               │
//!         ▼              ▼               ▼
//!   ┌──────────┐   ┌───────────┐   ┌─────────────┐
//!   │ analysis │   │ analysis  │   │   anomaly   │
//!   │ spectrum │   │ metrics / │   │ features →  │
//!   │waterfall │   │modulation │   │ forest → map│
//!   └──────────┘   └───────────┘   └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use spectra_core::config::SpectraConfig;
//! use spectra_core::pipeline::SpectrumPipeline;
//!
//! let samples: Vec<f64> = vec![0.0; 10_000];
//! let pipeline = SpectrumPipeline::from_config(SpectraConfig::default());
//! let report = pipeline.analyze(&samples).unwrap();
//! println!("{}", report.anomalies.verdict);
//! ```

pub mod analysis;
pub mod anomaly;
pub mod bands;
pub mod config;
pub mod fft_utils;
pub mod io;
pub mod pipeline;
pub mod types;

// Re-exports
pub use analysis::{
    compute_spectrum, compute_waterfall, extract_metrics, ModulationClass, PowerSpectrum,
    SignalMetrics, SpectrumAnalyzer, Waterfall, WaterfallGenerator, WindowFunction,
};
pub use anomaly::{
    map_anomalies, slice_features, AnomalyDetector, AnomalyRange, AnomalyReport,
    SliceClassification, Verdict,
};
pub use config::{ConfigError, SpectraConfig};
pub use pipeline::{AnalysisReport, SpectrumPipeline};
pub use types::{AnalysisError, AnalysisResult, DEFAULT_SAMPLE_RATE, SUPPORTED_FFT_SIZES};
