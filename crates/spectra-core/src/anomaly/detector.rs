//! Shared anomaly detector
//!
//! Owns the isolation forest used to score spectrum slices. The forest is
//! trained on a synthetic reference population the first time it is needed
//! (or eagerly through [`AnomalyDetector::fit`]) and is read-only afterwards.
//!
//! ```text
//! Uninitialized ──fit ok──▶ Fitted
//!       ▲    │
//!       └────┘ fit failed (error returned, retry allowed)
//! ```
//!
//! Concurrent first callers serialise on an internal mutex, so exactly one
//! forest is ever trained per detector. Once fitted, scoring only reads the
//! `OnceLock` and takes no lock.

use crate::anomaly::features::{FeatureVector, FEATURE_DIM};
use crate::anomaly::isolation_forest::IsolationForest;
use crate::config::AnomalyConfig;
use crate::types::{AnalysisError, AnalysisResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Model output for one slice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceClassification {
    /// Below the contamination threshold
    pub is_outlier: bool,
    /// Decision score; more negative is more anomalous
    pub score: f64,
}

/// Lazily fitted, thread-safe isolation forest over slice features
#[derive(Debug)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
    model: OnceLock<Arc<IsolationForest>>,
    fit_lock: Mutex<()>,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(AnomalyConfig::default())
    }
}

impl AnomalyDetector {
    /// Create an unfitted detector
    pub fn new(config: AnomalyConfig) -> Self {
        Self {
            config,
            model: OnceLock::new(),
            fit_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Whether the forest has been trained
    pub fn is_fitted(&self) -> bool {
        self.model.get().is_some()
    }

    /// Train now if not already trained. Idempotent.
    pub fn fit(&self) -> AnalysisResult<()> {
        self.model().map(|_| ())
    }

    /// Fitted forest, training it on first use
    pub fn model(&self) -> AnalysisResult<Arc<IsolationForest>> {
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        // The OnceLock is only written after a successful fit, so a
        // poisoned lock guards nothing stale.
        let _guard = self.fit_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        let forest = Arc::new(self.train()?);
        Ok(Arc::clone(self.model.get_or_init(|| forest)))
    }

    /// Score every feature vector, in input order
    pub fn classify(&self, vectors: &[FeatureVector]) -> AnalysisResult<Vec<SliceClassification>> {
        let model = self.model()?;
        Ok(vectors
            .iter()
            .map(|v| {
                let score = model.decision_function(v);
                SliceClassification {
                    is_outlier: score < 0.0,
                    score,
                }
            })
            .collect())
    }

    fn train(&self) -> AnalysisResult<IsolationForest> {
        let reference = reference_population(self.config.training_samples, self.config.seed);
        let forest = IsolationForest::fit(&reference, self.config.forest_params()).map_err(|e| {
            tracing::error!(error = %e, "anomaly model training failed");
            match e {
                AnalysisError::ModelInitialization(_) => e,
                other => AnalysisError::ModelInitialization(other.to_string()),
            }
        })?;

        tracing::info!(
            trees = forest.n_trees(),
            sample_size = forest.sample_size(),
            training_samples = reference.len(),
            offset = forest.offset(),
            "anomaly model fitted"
        );
        Ok(forest)
    }
}

/// Standard-normal reference vectors the forest is trained on
pub fn reference_population(n: usize, seed: u64) -> Vec<FeatureVector> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let mut v = [0.0; FEATURE_DIM];
            for x in v.iter_mut() {
                *x = rng.sample(StandardNormal);
            }
            v
        })
        .collect()
}
