//! Map slice classifications back onto the frequency axis

use crate::anomaly::detector::SliceClassification;
use crate::anomaly::features::FeatureVector;
use crate::types::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall outcome of anomaly detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    InterferenceDetected,
    Nominal,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::InterferenceDetected => "interference detected",
            Verdict::Nominal => "spectrum nominal",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One flagged slice, expressed in Hz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRange {
    pub start_freq: f64,
    pub end_freq: f64,
    /// Decision score rounded to 3 decimals
    pub score: f64,
}

/// Flagged ranges plus aggregate counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Flagged slices in slice order
    pub ranges: Vec<AnomalyRange>,
    pub n_anomalies: usize,
    pub n_total: usize,
    /// Percentage of flagged slices, rounded to 1 decimal
    pub anomaly_pct: f64,
    pub verdict: Verdict,
}

impl AnomalyReport {
    pub fn is_nominal(&self) -> bool {
        self.verdict == Verdict::Nominal
    }

    /// Format as text report
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str("Anomaly Detection\n");
        output.push_str(&"═".repeat(50));
        output.push('\n');
        output.push_str(&format!(
            "Flagged slices:    {} / {} ({:.1}%)\n",
            self.n_anomalies, self.n_total, self.anomaly_pct
        ));
        output.push_str(&format!("Verdict:           {}\n", self.verdict));
        for range in &self.ranges {
            output.push_str(&format!(
                "  {:>9.2} - {:>9.2} kHz  score {:+.3}\n",
                range.start_freq / 1000.0,
                range.end_freq / 1000.0,
                range.score
            ));
        }
        output
    }
}

/// Convert per-slice outlier flags into frequency ranges.
///
/// Slice `i` covers `freq_axis[i * step ..= (i + 1) * step - 1]` with
/// `step = len(freq_axis) / len(feature_vectors)`, clamped to the last bin.
/// With more slices than bins `step` is zero and every range runs from the
/// first bin to the last.
pub fn map_anomalies(
    feature_vectors: &[FeatureVector],
    classifications: &[SliceClassification],
    freq_axis: &[f64],
) -> AnalysisResult<AnomalyReport> {
    if feature_vectors.len() != classifications.len() {
        return Err(AnalysisError::Computation(format!(
            "{} feature vectors but {} classifications",
            feature_vectors.len(),
            classifications.len()
        )));
    }

    let n_total = feature_vectors.len();
    let ranges: Vec<AnomalyRange> = if n_total == 0 || freq_axis.is_empty() {
        Vec::new()
    } else {
        let step = freq_axis.len() / n_total;
        let last = freq_axis.len() - 1;
        classifications
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_outlier)
            .map(|(i, c)| AnomalyRange {
                start_freq: freq_axis[(i * step).min(last)],
                end_freq: freq_axis[((i + 1) * step).checked_sub(1).map_or(last, |e| e.min(last))],
                score: round_to(c.score, 3),
            })
            .collect()
    };

    let n_anomalies = classifications.iter().filter(|c| c.is_outlier).count();
    let anomaly_pct = round_to(100.0 * n_anomalies as f64 / n_total.max(1) as f64, 1);
    let verdict = if n_anomalies > 0 {
        Verdict::InterferenceDetected
    } else {
        Verdict::Nominal
    };

    Ok(AnomalyReport {
        ranges,
        n_anomalies,
        n_total,
        anomaly_pct,
        verdict,
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
