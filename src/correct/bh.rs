//! Benjamini-Hochberg false discovery rate correction.

use crate::data::AssociationTable;
use crate::error::{MinetError, Result};
use serde::{Deserialize, Serialize};

/// Column names tried, in order, when no p-value column is specified.
pub const PVALUE_COLUMNS: [&str; 4] = ["P.value", "P-value", "p-value", "p.value"];

/// Result of BH correction over one p-value column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BhCorrection {
    /// Name of the corrected column.
    pub column: String,
    /// Significance level used for the rejection flags.
    pub alpha: f64,
    /// Adjusted p-values (q-values), one per input row in input order.
    pub q_values: Vec<f64>,
    /// Rejection flag per row (`q <= alpha`).
    pub reject: Vec<bool>,
    /// Number of tests.
    pub n_tests: usize,
}

impl BhCorrection {
    /// Count significant results.
    pub fn n_significant(&self) -> usize {
        self.reject.iter().filter(|&&r| r).count()
    }
}

/// Apply Benjamini-Hochberg FDR correction to raw p-values.
///
/// Values are ranked ascending; the adjusted value at rank `i` is
/// `min(p[i] * n / rank[i], q[i+1])`, capped at 1, then mapped back to
/// the input order. The procedure is order-independent: each input row
/// gets exactly one adjusted value regardless of how rows are sorted.
pub fn correct_bh(p_values: &[f64], alpha: f64) -> (Vec<f64>, Vec<bool>) {
    let n = p_values.len();
    if n == 0 {
        return (vec![], vec![]);
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| {
        p_values[a]
            .partial_cmp(&p_values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let n_f64 = n as f64;
    let mut q_sorted = vec![0.0; n];

    // Step up from the largest p-value
    q_sorted[n - 1] = p_values[indices[n - 1]].min(1.0);
    for i in (0..n - 1).rev() {
        let rank = i + 1;
        let adjusted = p_values[indices[i]] * n_f64 / rank as f64;
        q_sorted[i] = adjusted.min(q_sorted[i + 1]).min(1.0);
    }

    let mut q_values = vec![0.0; n];
    for (i, &orig_idx) in indices.iter().enumerate() {
        q_values[orig_idx] = q_sorted[i];
    }

    let reject = q_values.iter().map(|&q| q <= alpha).collect();
    (q_values, reject)
}

/// Correct one p-value column of an association table.
///
/// With an explicit `column`, that column is corrected and a missing
/// name is a lookup error. With `None`, the conventional spellings in
/// [`PVALUE_COLUMNS`] are tried in order; if none matches, the error
/// names the accepted variants.
pub fn correct_table(
    table: &AssociationTable,
    column: Option<&str>,
    alpha: f64,
) -> Result<BhCorrection> {
    let (name, p_values) = match column {
        Some(name) => {
            let values = table
                .column(name)
                .ok_or_else(|| MinetError::UnknownColumn(name.to_string()))?;
            (name.to_string(), values)
        }
        None => PVALUE_COLUMNS
            .iter()
            .find_map(|&name| table.column(name).map(|values| (name.to_string(), values)))
            .ok_or_else(|| MinetError::MissingPvalueColumn(PVALUE_COLUMNS.join(", ")))?,
    };

    let (q_values, reject) = correct_bh(&p_values, alpha);
    Ok(BhCorrection {
        column: name,
        alpha,
        n_tests: q_values.len(),
        q_values,
        reject,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AssociationRecord, FISHER_P_COLUMN};
    use approx::assert_relative_eq;

    #[test]
    fn test_bh_known_values() {
        // 5 tests, p = [0.005, 0.01, 0.02, 0.04, 0.1]:
        // rank 1: 0.005 * 5/1 = 0.025
        // rank 2: 0.01 * 5/2 = 0.025
        // rank 3: 0.02 * 5/3 = 0.0333
        // rank 4: 0.04 * 5/4 = 0.05
        // rank 5: 0.1 * 5/5 = 0.1
        let p_values = vec![0.005, 0.01, 0.02, 0.04, 0.1];
        let (q, _) = correct_bh(&p_values, 0.05);

        assert_relative_eq!(q[0], 0.025, epsilon = 1e-10);
        assert_relative_eq!(q[1], 0.025, epsilon = 1e-10);
        assert_relative_eq!(q[2], 1.0 / 30.0, epsilon = 1e-10);
        assert_relative_eq!(q[3], 0.05, epsilon = 1e-10);
        assert_relative_eq!(q[4], 0.1, epsilon = 1e-10);
    }

    #[test]
    fn test_bh_order_independent() {
        let sorted = vec![0.005, 0.01, 0.02, 0.04, 0.1];
        let scrambled = vec![0.1, 0.02, 0.005, 0.04, 0.01];

        let (q_sorted, _) = correct_bh(&sorted, 0.05);
        let (q_scrambled, _) = correct_bh(&scrambled, 0.05);

        // Same raw p must receive the same q in either layout
        assert_relative_eq!(q_scrambled[2], q_sorted[0], epsilon = 1e-12);
        assert_relative_eq!(q_scrambled[4], q_sorted[1], epsilon = 1e-12);
        assert_relative_eq!(q_scrambled[1], q_sorted[2], epsilon = 1e-12);
        assert_relative_eq!(q_scrambled[3], q_sorted[3], epsilon = 1e-12);
        assert_relative_eq!(q_scrambled[0], q_sorted[4], epsilon = 1e-12);
    }

    #[test]
    fn test_bh_monotone_in_sorted_order() {
        let p_values = vec![0.001, 0.01, 0.02, 0.05, 0.1, 0.5];
        let (q, _) = correct_bh(&p_values, 0.05);

        let mut prev = 0.0;
        for &value in &q {
            assert!(value >= prev - 1e-12);
            prev = value;
        }
    }

    #[test]
    fn test_bh_bounded_and_rejections() {
        let p_values = vec![0.001, 0.5, 0.6, 0.7, 0.9];
        let (q, reject) = correct_bh(&p_values, 0.05);

        for &value in &q {
            assert!(value <= 1.0);
        }
        assert!(reject[0]);
        assert!(!reject[1]);
    }

    #[test]
    fn test_bh_empty_and_single() {
        let (q, reject) = correct_bh(&[], 0.05);
        assert!(q.is_empty());
        assert!(reject.is_empty());

        let (q, _) = correct_bh(&[0.03], 0.05);
        assert_relative_eq!(q[0], 0.03, epsilon = 1e-12);
    }

    fn table_with_pvalues(p_values: &[f64]) -> AssociationTable {
        let records = p_values
            .iter()
            .enumerate()
            .map(|(i, &p)| AssociationRecord {
                feature1: format!("asv_{}", i),
                feature2: "asv_x".to_string(),
                n12: 3,
                n1: 4,
                n2: 5,
                log_odds_ratio: 0.1,
                rho: 0.2,
                p_fisher: p,
                p_pearson: p / 2.0,
                lr12: 0.0,
                lr21: 0.0,
                p12: 0.5,
                p21: 0.5,
                q_fisher: None,
                q_pearson: None,
            })
            .collect();
        AssociationTable::new(records)
    }

    #[test]
    fn test_correct_table_explicit_column() {
        let table = table_with_pvalues(&[0.01, 0.04, 0.03]);
        let correction = correct_table(&table, Some(FISHER_P_COLUMN), 0.05).unwrap();

        assert_eq!(correction.column, FISHER_P_COLUMN);
        assert_eq!(correction.n_tests, 3);
        assert_eq!(correction.q_values.len(), 3);
        // q = [0.03, 0.04, 0.04], all within alpha
        assert_eq!(correction.n_significant(), 3);
    }

    #[test]
    fn test_correct_table_unknown_column() {
        let table = table_with_pvalues(&[0.01]);
        let result = correct_table(&table, Some("no_such_column"), 0.05);
        assert!(matches!(result, Err(MinetError::UnknownColumn(_))));
    }

    #[test]
    fn test_correct_table_default_lookup_fails_with_variants() {
        // The association schema has no generically-named p-value column,
        // so the default search must fail and list the accepted names.
        let table = table_with_pvalues(&[0.01]);
        let result = correct_table(&table, None, 0.05);

        match result {
            Err(MinetError::MissingPvalueColumn(names)) => {
                for expected in PVALUE_COLUMNS {
                    assert!(names.contains(expected), "missing '{}' in {}", expected, names);
                }
            }
            other => panic!("expected MissingPvalueColumn, got {:?}", other),
        }
    }
}
