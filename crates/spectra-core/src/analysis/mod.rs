//! Signal Analysis Module
//!
//! Spectrum, waterfall and signal quality analysis for real-valued sample
//! buffers.
//!
//! ## Features
//!
//! - **Spectrum Analysis**: windowed one-sided magnitude spectrum in dB
//! - **Waterfall Display**: time-frequency matrix with ASCII output
//! - **Signal Metrics**: peak, noise floor, SNR, -3/-10 dB bandwidth
//! - **Modulation**: ordered rule table over envelope statistics and SNR
//!
//! ## Example
//!
//! ```rust,no_run
//! use spectra_core::analysis::{extract_metrics, SpectrumAnalyzer, WindowFunction};
//!
//! let samples: Vec<f64> = vec![]; // Your samples
//! let sample_rate = 1_000_000.0;
//!
//! let analyzer = SpectrumAnalyzer::with_window(2048, WindowFunction::Hann);
//! let spectrum = analyzer.compute(&samples, sample_rate).unwrap();
//!
//! let metrics = extract_metrics(&spectrum, &samples).unwrap();
//! println!("SNR: {:.1} dB", metrics.snr_db);
//! ```

pub mod metrics;
pub mod modulation;
pub mod spectrum;
pub mod waterfall;

pub use metrics::{extract_metrics, SignalMetrics};
pub use modulation::{ModulationClass, ModulationClassifier, ModulationFeatures, ModulationRule};
pub use spectrum::{compute_spectrum, PowerSpectrum, SpectrumAnalyzer, WindowFunction};
pub use waterfall::{compute_waterfall, Waterfall, WaterfallGenerator};
