//! Spectrum slice features
//!
//! A spectrum of `n` bins is cut into `k` contiguous groups. With
//! `q = n / k` and `r = n % k`, the first `r` groups hold `q + 1` bins and the
//! rest hold `q`. Groups that end up empty (`n < k`) are dropped.
//!
//! ```text
//! bins:  |0 1 2 3|4 5 6 7|8 9 10|11 12 13|     n = 14, k = 4
//!         └ q+1 ┘ └ q+1 ┘ └ q  ┘ └  q   ┘
//! ```

use crate::types::{AnalysisError, AnalysisResult};

/// Number of statistics per slice
pub const FEATURE_DIM: usize = 5;

/// Default number of slices per spectrum
pub const DEFAULT_FEATURE_SLICES: usize = 30;

/// `[mean, std, max, min, max - min]` of one slice
pub type FeatureVector = [f64; FEATURE_DIM];

/// Sizes of the near-equal partitions of `len` items into `n_slices` groups
pub fn partition_sizes(len: usize, n_slices: usize) -> Vec<usize> {
    if n_slices == 0 {
        return Vec::new();
    }
    let base = len / n_slices;
    let extra = len % n_slices;
    (0..n_slices)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Reduce one slice to its statistic vector (population std)
pub fn slice_statistics(values: &[f64]) -> FeatureVector {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    [mean, var.sqrt(), max, min, max - min]
}

/// Partition `power_db` into `n_slices` groups and reduce each one.
///
/// Output order follows the partitions from low to high frequency.
pub fn slice_features(power_db: &[f64], n_slices: usize) -> AnalysisResult<Vec<FeatureVector>> {
    if n_slices == 0 {
        return Err(AnalysisError::InvalidParameter(
            "number of feature slices must be positive".to_string(),
        ));
    }

    let mut features = Vec::with_capacity(n_slices);
    let mut start = 0;
    for size in partition_sizes(power_db.len(), n_slices) {
        if size == 0 {
            continue;
        }
        features.push(slice_statistics(&power_db[start..start + size]));
        start += size;
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_sizes() {
        assert_eq!(partition_sizes(14, 4), vec![4, 4, 3, 3]);
        assert_eq!(partition_sizes(12, 4), vec![3, 3, 3, 3]);
        assert_eq!(partition_sizes(3, 5), vec![1, 1, 1, 0, 0]);

        let sizes = partition_sizes(1025, 30);
        assert_eq!(sizes.iter().sum::<usize>(), 1025);
        assert_eq!(sizes[..5], [35; 5]);
        assert!(sizes[5..].iter().all(|&s| s == 34));
    }

    #[test]
    fn test_slice_statistics() {
        let stats = slice_statistics(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats[0], 2.5);
        assert!((stats[1] - 1.25f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats[2], 4.0);
        assert_eq!(stats[3], 1.0);
        assert_eq!(stats[4], 3.0);
    }

    #[test]
    fn test_slice_order_and_boundaries() {
        let values: Vec<f64> = (0..14).map(|v| v as f64).collect();
        let features = slice_features(&values, 4).unwrap();
        assert_eq!(features.len(), 4);
        // Slices: [0..4], [4..8], [8..11], [11..14]
        assert_eq!(features[0][3], 0.0);
        assert_eq!(features[1][3], 4.0);
        assert_eq!(features[2][3], 8.0);
        assert_eq!(features[2][2], 10.0);
        assert_eq!(features[3][3], 11.0);
        assert_eq!(features[3][2], 13.0);
    }

    #[test]
    fn test_empty_slices_skipped() {
        let features = slice_features(&[1.0, 2.0, 3.0], 30).unwrap();
        assert_eq!(features.len(), 3);
        assert!(features.iter().all(|f| f[1] == 0.0 && f[4] == 0.0));

        assert!(slice_features(&[], 30).unwrap().is_empty());
    }

    #[test]
    fn test_zero_slices_rejected() {
        assert!(slice_features(&[1.0], 0).unwrap_err().is_input_error());
    }
}
