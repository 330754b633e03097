//! Quantitative correlation for a feature pair.

use crate::stats::pearson;
use serde::{Deserialize, Serialize};

/// Pairs with this many or fewer co-occurring samples are not tested.
const MIN_COOCCURRING: usize = 5;

/// Correlation statistics for one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Pearson correlation of log counts, 0 when not testable.
    pub rho: f64,
    /// Two-sided p-value, 1 when not testable.
    pub p_value: f64,
}

impl CorrelationResult {
    fn untestable() -> Self {
        Self {
            rho: 0.0,
            p_value: 1.0,
        }
    }
}

/// Pearson correlation of natural-log counts over co-occurring samples.
///
/// Only samples where both features are present contribute. With 5 or
/// fewer such samples the estimate is unreliable and the neutral result
/// `(rho = 0, p = 1)` is reported; the same applies when either
/// log-transformed vector is constant.
pub fn test_correlation(v1: &[u64], v2: &[u64]) -> CorrelationResult {
    debug_assert_eq!(v1.len(), v2.len());

    let mut log1 = Vec::new();
    let mut log2 = Vec::new();
    for i in 0..v1.len() {
        if v1[i] > 0 && v2[i] > 0 {
            log1.push((v1[i] as f64).ln());
            log2.push((v2[i] as f64).ln());
        }
    }

    if log1.len() <= MIN_COOCCURRING {
        return CorrelationResult::untestable();
    }

    if is_constant(&log1) || is_constant(&log2) {
        return CorrelationResult::untestable();
    }

    let (rho, p_value) = pearson(&log1, &log2);
    CorrelationResult { rho, p_value }
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|&v| v == values[0])
}
