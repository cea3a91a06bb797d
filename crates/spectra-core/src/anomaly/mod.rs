//! Spectral Anomaly Detection
//!
//! Flags frequency ranges whose local power statistics look unlike a
//! reference population.
//!
//! ```text
//! power_db ──▶ slice_features ──▶ AnomalyDetector::classify ──▶ map_anomalies
//!              (30 × [mean, std,    (isolation forest,            (Hz ranges,
//!               max, min, range])    decision scores)              verdict)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use spectra_core::anomaly::{detect_anomalies, AnomalyDetector};
//! use spectra_core::analysis::{compute_spectrum, WindowFunction};
//!
//! let samples: Vec<f64> = vec![]; // Your samples
//! let spectrum = compute_spectrum(&samples, 1e6, WindowFunction::Hann, 2048).unwrap();
//!
//! let detector = AnomalyDetector::default();
//! let report = detect_anomalies(&detector, &spectrum, 30).unwrap();
//! println!("{}", report.verdict);
//! ```

pub mod detector;
pub mod features;
pub mod isolation_forest;
pub mod mapper;

pub use detector::{AnomalyDetector, SliceClassification};
pub use features::{slice_features, FeatureVector, DEFAULT_FEATURE_SLICES, FEATURE_DIM};
pub use isolation_forest::{IsolationForest, IsolationForestParams};
pub use mapper::{map_anomalies, AnomalyRange, AnomalyReport, Verdict};

use crate::analysis::spectrum::PowerSpectrum;
use crate::types::AnalysisResult;

/// Slice, score and map one spectrum
pub fn detect_anomalies(
    detector: &AnomalyDetector,
    spectrum: &PowerSpectrum,
    n_slices: usize,
) -> AnalysisResult<AnomalyReport> {
    let features = slice_features(&spectrum.power_db, n_slices)?;
    let classifications = detector.classify(&features)?;
    map_anomalies(&features, &classifications, &spectrum.frequencies)
}
