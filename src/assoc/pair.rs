//! Pair enumeration for the association engine.

use crate::data::FeatureMatrix;

/// One unit of work for the worker pool: an unordered feature pair with
/// its count vectors and a 1-based sequence number.
///
/// Jobs are immutable and consumed by exactly one worker. The sequence
/// number fixes the row order of the final table and seeds the per-job
/// permutation generator.
#[derive(Debug, Clone)]
pub struct PairJob {
    pub feature1: String,
    pub feature2: String,
    pub v1: Vec<u64>,
    pub v2: Vec<u64>,
    pub sequence: usize,
}

/// Enumerate all unordered feature pairs of a matrix.
///
/// Iterates with outer index `i` and inner index `j`, taking the pair
/// whenever `i > j`, so a matrix of `N` features always yields exactly
/// `N * (N - 1) / 2` jobs in the same order.
pub fn generate_pairs(matrix: &FeatureMatrix) -> Vec<PairJob> {
    let ids = matrix.feature_ids();
    let n = ids.len();

    let mut jobs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    let mut sequence = 1;
    for i in 0..n {
        for j in 0..n {
            if i > j {
                jobs.push(PairJob {
                    feature1: ids[i].clone(),
                    feature2: ids[j].clone(),
                    v1: matrix.row_dense(i),
                    v2: matrix.row_dense(j),
                    sequence,
                });
                sequence += 1;
            }
        }
    }
    jobs
}
