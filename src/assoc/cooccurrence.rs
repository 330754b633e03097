//! Co-occurrence significance for a feature pair.
//!
//! Presence patterns of the two features are cross-tabulated and tested
//! with Fisher's exact test, following the co-occurrence framework of
//! Chaffron et al. (2010), Genome Research 20(7).

use crate::stats::fisher_exact;
use serde::{Deserialize, Serialize};

/// Co-occurrence statistics for one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooccurrenceResult {
    /// Samples where both features are present.
    pub n12: usize,
    /// Samples where feature 1 is present.
    pub n1: usize,
    /// Samples where feature 2 is present.
    pub n2: usize,
    /// Observed/expected co-occurrence ratio.
    pub odds_ratio: f64,
    /// Log2 of the odds ratio; exactly 0 when the ratio is exactly 1.
    pub log_odds_ratio: f64,
    /// Two-sided Fisher exact p-value.
    pub p_value: f64,
}

/// Test co-occurrence of two count vectors.
///
/// Builds the 2x2 contingency table of joint presence/absence and runs a
/// two-sided Fisher exact test. The odds ratio compares the empirical
/// co-occurrence probability with the product of the marginal presence
/// probabilities; when either feature is entirely absent it is defined
/// as the neutral value 1.
pub fn test_cooccurrence(v1: &[u64], v2: &[u64]) -> CooccurrenceResult {
    debug_assert_eq!(v1.len(), v2.len());
    let n = v1.len();

    let mut n12 = 0usize;
    let mut n1_2 = 0usize;
    let mut n2_1 = 0usize;
    for i in 0..n {
        match (v1[i] > 0, v2[i] > 0) {
            (true, true) => n12 += 1,
            (true, false) => n1_2 += 1,
            (false, true) => n2_1 += 1,
            (false, false) => {}
        }
    }
    let n1 = n12 + n1_2;
    let n2 = n12 + n2_1;
    let n_12 = n - n12 - n1_2 - n2_1;

    let p_value = fisher_exact([
        [n12 as u64, n1_2 as u64],
        [n2_1 as u64, n_12 as u64],
    ]);

    let n_f64 = n as f64;
    let p1 = n1 as f64 / n_f64;
    let p2 = n2 as f64 / n_f64;
    let p12 = n12 as f64 / n_f64;

    let odds_ratio = if p1 == 0.0 || p2 == 0.0 {
        1.0
    } else {
        p12 / (p1 * p2)
    };

    let log_odds_ratio = if odds_ratio == 1.0 {
        0.0
    } else {
        odds_ratio.log2()
    };

    CooccurrenceResult {
        n12,
        n1,
        n2,
        odds_ratio,
        log_odds_ratio,
        p_value,
    }
}
