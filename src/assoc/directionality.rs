//! Directionality inference via a permutation test.
//!
//! Symmetric co-occurrence cannot say whether feature A's presence
//! conditions feature B's more than the reverse. The two directional
//! log-ratio statistics compare the "both present" cell against each
//! single-presence cell; their significance comes from an empirical null
//! built by reshuffling feature B's presence pattern.

use crate::stats::XorShiftRng;
use serde::{Deserialize, Serialize};

/// Pseudocount added to every contingency cell before taking logs.
const PSEUDOCOUNT: f64 = 0.01;

/// Directional statistics and permutation p-values for one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionalityResult {
    /// Directional log-ratio, feature1 -> feature2.
    pub lr12: f64,
    /// Directional log-ratio, feature2 -> feature1.
    pub lr21: f64,
    /// Permutation p-value for `lr12`.
    pub p12: f64,
    /// Permutation p-value for `lr21`.
    pub p21: f64,
}

/// Run the directionality permutation test.
///
/// The null distribution holds `n_permutations` (lr12, lr21) pairs, each
/// obtained by reshuffling B's presence vector in place while A stays
/// fixed. Every iteration advances the caller's generator, so draws are
/// independent across iterations and across jobs.
pub fn test_directionality(
    v1: &[u64],
    v2: &[u64],
    n_permutations: usize,
    rng: &mut XorShiftRng,
) -> DirectionalityResult {
    debug_assert_eq!(v1.len(), v2.len());

    let presence_a: Vec<bool> = v1.iter().map(|&v| v > 0).collect();
    let presence_b: Vec<bool> = v2.iter().map(|&v| v > 0).collect();

    let (lr12, lr21) = log_ratios(contingency(&presence_a, &presence_b));

    let mut shuffled_b = presence_b;
    let mut null12 = Vec::with_capacity(n_permutations);
    let mut null21 = Vec::with_capacity(n_permutations);
    for _ in 0..n_permutations {
        rng.shuffle(&mut shuffled_b);
        let (s12, s21) = log_ratios(contingency(&presence_a, &shuffled_b));
        null12.push(s12);
        null21.push(s21);
    }

    DirectionalityResult {
        lr12,
        lr21,
        p12: permutation_pvalue(lr12, &null12),
        p21: permutation_pvalue(lr21, &null21),
    }
}

/// Joint presence/absence contingency table.
///
/// Indexed by `(1 - presence)`, so cell `[0][0]` counts samples where
/// both features are present. The inversion follows the reference
/// formulation and must not be changed independently of `log_ratios`.
fn contingency(a: &[bool], b: &[bool]) -> [[f64; 2]; 2] {
    let mut ct = [[0.0f64; 2]; 2];
    for i in 0..a.len() {
        let row = !a[i] as usize;
        let col = !b[i] as usize;
        ct[row][col] += 1.0;
    }
    ct
}

/// Directional log2 ratios of the pseudocounted table.
fn log_ratios(mut ct: [[f64; 2]; 2]) -> (f64, f64) {
    for row in ct.iter_mut() {
        for cell in row.iter_mut() {
            *cell += PSEUDOCOUNT;
        }
    }
    let lr12 = (ct[0][0] / ct[1][0]).log2();
    let lr21 = (ct[0][0] / ct[0][1]).log2();
    (lr12, lr21)
}

/// One-sided empirical p-value with add-one correction.
///
/// Positive statistics are tested against the upper tail, the rest
/// against the lower tail. The +1 keeps the p-value off zero: with `m`
/// null samples the result is always in `[1/(m+1), 1]`.
pub fn permutation_pvalue(observed: f64, null: &[f64]) -> f64 {
    let count = if observed > 0.0 {
        null.iter().filter(|&&s| s > observed).count()
    } else {
        null.iter().filter(|&&s| s < observed).count()
    };
    (count as f64 + 1.0) / (null.len() as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_contingency_indexing() {
        let a = [true, true, false, false, true];
        let b = [true, false, false, false, true];
        let ct = contingency(&a, &b);

        // [0][0] both present, [0][1] only A, [1][0] only B, [1][1] neither
        assert_eq!(ct[0][0], 2.0);
        assert_eq!(ct[0][1], 1.0);
        assert_eq!(ct[1][0], 0.0);
        assert_eq!(ct[1][1], 2.0);
    }

    #[test]
    fn test_log_ratios_pseudocount() {
        let ct = [[2.0, 1.0], [0.0, 2.0]];
        let (lr12, lr21) = log_ratios(ct);

        assert_relative_eq!(lr12, (2.01f64 / 0.01).log2(), epsilon = 1e-12);
        assert_relative_eq!(lr21, (2.01f64 / 1.01).log2(), epsilon = 1e-12);
    }

    #[test]
    fn test_pvalue_bounds() {
        let null: Vec<f64> = (0..999).map(|i| (i as f64 - 500.0) / 100.0).collect();

        for observed in [-20.0, -1.0, 0.0, 0.5, 3.0, 20.0] {
            let p = permutation_pvalue(observed, &null);
            assert!(p >= 1.0 / 1000.0, "p below floor for {}: {}", observed, p);
            assert!(p <= 1.0, "p above 1 for {}: {}", observed, p);
        }
    }

    #[test]
    fn test_pvalue_never_zero_at_extremes() {
        let null = vec![0.0; 999];
        assert_relative_eq!(permutation_pvalue(100.0, &null), 1.0 / 1000.0);
        assert_relative_eq!(permutation_pvalue(-100.0, &null), 1.0 / 1000.0);
    }

    #[test]
    fn test_pvalue_tail_selection() {
        let null = vec![-2.0, -1.0, 1.0, 2.0];
        // Positive observed counts strictly greater null values
        assert_relative_eq!(permutation_pvalue(0.5, &null), 3.0 / 5.0);
        // Non-positive observed counts strictly smaller null values
        assert_relative_eq!(permutation_pvalue(0.0, &null), 3.0 / 5.0);
        assert_relative_eq!(permutation_pvalue(-1.5, &null), 2.0 / 5.0);
    }

    #[test]
    fn test_directionality_reproducible() {
        let v1 = [3, 0, 1, 0, 9, 2, 0, 4, 1, 0];
        let v2 = [1, 0, 5, 1, 7, 0, 0, 2, 0, 3];

        let mut rng1 = XorShiftRng::new(42);
        let mut rng2 = XorShiftRng::new(42);
        let a = test_directionality(&v1, &v2, 999, &mut rng1);
        let b = test_directionality(&v1, &v2, 999, &mut rng2);

        assert_eq!(a.lr12, b.lr12);
        assert_eq!(a.lr21, b.lr21);
        assert_eq!(a.p12, b.p12);
        assert_eq!(a.p21, b.p21);
    }

    #[test]
    fn test_directionality_pvalue_range() {
        let v1 = [3, 0, 1, 0, 9, 2, 0, 4, 1, 0, 2, 2];
        let v2 = [1, 0, 5, 1, 7, 0, 0, 2, 0, 3, 0, 1];

        let mut rng = XorShiftRng::new(7);
        let result = test_directionality(&v1, &v2, 999, &mut rng);

        for p in [result.p12, result.p21] {
            assert!(p >= 1.0 / 1000.0 && p <= 1.0);
        }
    }

    #[test]
    fn test_observed_statistics_unaffected_by_permutations() {
        let v1 = [3, 0, 1, 0, 9, 2, 0, 4];
        let v2 = [1, 0, 5, 1, 7, 0, 0, 2];

        let presence_a: Vec<bool> = v1.iter().map(|&v| v > 0).collect();
        let presence_b: Vec<bool> = v2.iter().map(|&v| v > 0).collect();
        let (expected12, expected21) = log_ratios(contingency(&presence_a, &presence_b));

        let mut rng = XorShiftRng::new(11);
        let result = test_directionality(&v1, &v2, 99, &mut rng);
        assert_eq!(result.lr12, expected12);
        assert_eq!(result.lr21, expected21);
    }
}
