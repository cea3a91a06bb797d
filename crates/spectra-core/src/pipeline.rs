//! Combined analysis pipeline
//!
//! ```text
//! samples ──▶ spectrum ──┬──▶ metrics
//!    │                   └──▶ slice features ──▶ detector ──▶ anomaly ranges
//!    └──────▶ waterfall (optional)
//! ```
//!
//! Every call is synchronous and only reads shared state (the fitted
//! detector), so one pipeline may be used from many threads at once.

use crate::analysis::metrics::SignalMetrics;
use crate::analysis::spectrum::{PowerSpectrum, SpectrumAnalyzer};
use crate::analysis::waterfall::{Waterfall, WaterfallGenerator};
use crate::anomaly::detector::AnomalyDetector;
use crate::anomaly::{self, AnomalyReport};
use crate::config::SpectraConfig;
use crate::types::{AnalysisError, AnalysisResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Everything computed for one sample buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub spectrum: PowerSpectrum,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waterfall: Option<Waterfall>,
    pub metrics: SignalMetrics,
    pub anomalies: AnomalyReport,
}

impl AnalysisReport {
    /// Format as text report
    pub fn to_text(&self) -> String {
        let mut output = self.spectrum.to_text();
        output.push('\n');
        if let Some(waterfall) = &self.waterfall {
            output.push_str(&format!(
                "Waterfall:         {} rows x {} bins (step {} samples)\n\n",
                waterfall.num_rows(),
                waterfall.frequencies.len(),
                waterfall.step
            ));
        }
        output.push_str(&self.metrics.to_text());
        output.push('\n');
        output.push_str(&self.anomalies.to_text());
        output
    }

    /// Format as pretty-printed JSON
    pub fn to_json(&self) -> AnalysisResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnalysisError::Computation(e.to_string()))
    }
}

/// Spectrum → metrics → anomaly pipeline bound to one configuration
#[derive(Debug, Clone)]
pub struct SpectrumPipeline {
    config: SpectraConfig,
    analyzer: SpectrumAnalyzer,
    waterfall: Option<WaterfallGenerator>,
    detector: Arc<AnomalyDetector>,
}

impl SpectrumPipeline {
    /// Create a pipeline sharing an existing detector
    pub fn new(config: SpectraConfig, detector: Arc<AnomalyDetector>) -> Self {
        let analyzer = SpectrumAnalyzer::with_window(config.spectrum.fft_size, config.spectrum.window);
        let waterfall = config
            .waterfall
            .enabled
            .then(|| WaterfallGenerator::new(config.waterfall.slice_size, config.waterfall.n_slices));
        Self {
            config,
            analyzer,
            waterfall,
            detector,
        }
    }

    /// Create a pipeline with its own detector built from `config.anomaly`
    pub fn from_config(config: SpectraConfig) -> Self {
        let detector = Arc::new(AnomalyDetector::new(config.anomaly.clone()));
        Self::new(config, detector)
    }

    pub fn config(&self) -> &SpectraConfig {
        &self.config
    }

    pub fn detector(&self) -> &Arc<AnomalyDetector> {
        &self.detector
    }

    /// Power spectrum of `samples` at the configured rate, window and size
    pub fn spectrum(&self, samples: &[f64]) -> AnalysisResult<PowerSpectrum> {
        self.analyzer.compute(samples, self.config.spectrum.sample_rate)
    }

    /// Waterfall of `samples`, or `None` when disabled
    pub fn waterfall(&self, samples: &[f64]) -> AnalysisResult<Option<Waterfall>> {
        self.waterfall
            .as_ref()
            .map(|generator| generator.compute(samples, self.config.spectrum.sample_rate))
            .transpose()
    }

    /// Slice, score and map one spectrum
    pub fn detect_anomalies(&self, spectrum: &PowerSpectrum) -> AnalysisResult<AnomalyReport> {
        anomaly::detect_anomalies(&self.detector, spectrum, self.config.anomaly.n_slices)
    }

    /// Run every stage on `samples`
    pub fn analyze(&self, samples: &[f64]) -> AnalysisResult<AnalysisReport> {
        debug!(samples = samples.len(), "analysis started");

        let spectrum = self.spectrum(samples)?;
        debug!(
            bins = spectrum.len(),
            fft_size = spectrum.fft_size,
            window = spectrum.window.name(),
            "spectrum computed"
        );

        let waterfall = self.waterfall(samples)?;
        if let Some(w) = &waterfall {
            debug!(rows = w.num_rows(), step = w.step, "waterfall computed");
        }

        let metrics = SignalMetrics::compute(&spectrum, samples)?;
        debug!(
            peak_hz = metrics.peak_freq,
            snr_db = metrics.snr_db,
            modulation = %metrics.modulation,
            "metrics extracted"
        );

        let anomalies = self.detect_anomalies(&spectrum)?;
        debug!(
            flagged = anomalies.n_anomalies,
            total = anomalies.n_total,
            verdict = %anomalies.verdict,
            "anomaly detection finished"
        );

        Ok(AnalysisReport {
            spectrum,
            waterfall,
            metrics,
            anomalies,
        })
    }
}
