//! Isolation Forest
//!
//! An ensemble of randomized binary partitioning trees. Each tree is grown on
//! a random sub-sample by repeatedly picking a feature and a split value
//! between that feature's min and max. Outliers sit in sparse regions and are
//! separated from the rest after few splits, so their average path length
//! across the ensemble is short.
//!
//! ```text
//! s(x)      = -2^( -E[h(x)] / c(ψ) )         ∈ [-1, 0)
//! offset    = contamination-quantile of s over the training set
//! decision  = s(x) - offset                  (< 0 ⇒ outlier)
//! ```
//!
//! `c(n)` is the average path length of an unsuccessful binary-search-tree
//! lookup and normalizes `h` for sub-sample size ψ.

use crate::types::{AnalysisError, AnalysisResult};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Forest hyper-parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsolationForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Sub-sample drawn (without replacement) per tree
    pub max_samples: usize,
    /// Expected outlier fraction in the training data
    pub contamination: f64,
    /// Seed for sub-sampling and splits
    pub seed: u64,
}

impl Default for IsolationForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.08,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// One isolation tree
#[derive(Debug, Clone)]
pub struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn grow<V: AsRef<[f64]>>(
        data: &[V],
        indices: Vec<usize>,
        dim: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> Self {
        Self {
            root: Self::grow_node(data, indices, dim, 0, max_depth, rng),
        }
    }

    fn grow_node<V: AsRef<[f64]>>(
        data: &[V],
        indices: Vec<usize>,
        dim: usize,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> Node {
        if depth >= max_depth || indices.len() <= 1 {
            return Node::Leaf {
                size: indices.len(),
            };
        }

        // Only features that still vary inside this node can split it
        let candidates: Vec<(usize, f64, f64)> = (0..dim)
            .filter_map(|f| {
                let (lo, hi) = indices.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), &i| {
                        let v = data[i].as_ref()[f];
                        (lo.min(v), hi.max(v))
                    },
                );
                (hi > lo).then_some((f, lo, hi))
            })
            .collect();

        if candidates.is_empty() {
            return Node::Leaf {
                size: indices.len(),
            };
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = rng.gen_range(lo..hi);

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| data[i].as_ref()[feature] < threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(Self::grow_node(data, left, dim, depth + 1, max_depth, rng)),
            right: Box::new(Self::grow_node(data, right, dim, depth + 1, max_depth, rng)),
        }
    }

    /// Path length of `x`, including the `c(size)` correction at the leaf
    pub fn path_length(&self, x: &[f64]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] < *threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Fitted isolation forest
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    dim: usize,
    sample_size: usize,
    offset: f64,
    params: IsolationForestParams,
}

impl IsolationForest {
    /// Fit the forest on `data` and calibrate the outlier threshold
    pub fn fit<V: AsRef<[f64]>>(data: &[V], params: IsolationForestParams) -> AnalysisResult<Self> {
        if data.is_empty() {
            return Err(AnalysisError::ModelInitialization(
                "training set is empty".to_string(),
            ));
        }
        if params.n_estimators == 0 || params.max_samples == 0 {
            return Err(AnalysisError::ModelInitialization(format!(
                "need at least one tree and one sample per tree, got {} trees x {} samples",
                params.n_estimators, params.max_samples
            )));
        }
        if !(params.contamination > 0.0 && params.contamination <= 0.5) {
            return Err(AnalysisError::ModelInitialization(format!(
                "contamination must be in (0, 0.5], got {}",
                params.contamination
            )));
        }

        let dim = data[0].as_ref().len();
        if dim == 0 || data.iter().any(|v| v.as_ref().len() != dim) {
            return Err(AnalysisError::ModelInitialization(
                "training vectors must share a non-zero dimension".to_string(),
            ));
        }
        if data.iter().any(|v| v.as_ref().iter().any(|x| !x.is_finite())) {
            return Err(AnalysisError::ModelInitialization(
                "training vectors contain non-finite values".to_string(),
            ));
        }

        let sample_size = params.max_samples.min(data.len());
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let trees: Vec<IsolationTree> = (0..params.n_estimators)
            .map(|_| {
                let indices = sample(&mut rng, data.len(), sample_size).into_vec();
                IsolationTree::grow(data, indices, dim, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            dim,
            sample_size,
            offset: 0.0,
            params,
        };

        let mut training_scores: Vec<f64> = data
            .iter()
            .map(|v| forest.score_sample(v.as_ref()))
            .collect();
        training_scores.sort_by(|a, b| a.total_cmp(b));
        forest.offset = percentile(&training_scores, params.contamination);

        Ok(forest)
    }

    /// Feature dimension the forest was trained on
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Sub-sample size per tree
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Score threshold separating inliers from outliers
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Parameters used for fitting
    pub fn params(&self) -> &IsolationForestParams {
        &self.params
    }

    /// Mean path length of `x` over all trees
    pub fn mean_path_length(&self, x: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(x)).sum();
        total / self.trees.len() as f64
    }

    /// Raw anomaly score in [-1, 0); lower is more anomalous
    pub fn score_sample(&self, x: &[f64]) -> f64 {
        let norm = average_path_length(self.sample_size).max(f64::MIN_POSITIVE);
        -(2f64.powf(-self.mean_path_length(x) / norm))
    }

    /// Score shifted by the contamination threshold; negative means outlier
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.score_sample(x) - self.offset
    }

    /// True when `x` falls below the contamination threshold
    pub fn is_outlier(&self, x: &[f64]) -> bool {
        self.decision_function(x) < 0.0
    }
}

/// Average path length of an unsuccessful search in a BST of `n` nodes
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolated quantile `q ∈ [0, 1]` of an ascending slice
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
