//! Feature table preprocessing: depth rarefaction and prevalence filtering.
//!
//! Samples sequenced below the depth cutoff are dropped; the remainder are
//! rarefied by drawing reads without replacement down to exactly the
//! cutoff, which removes library-size differences before association
//! testing. Features observed in too few samples are then removed.

use crate::data::FeatureMatrix;
use crate::error::{MinetError, Result};
use crate::stats::XorShiftRng;
use sprs::TriMat;

/// Drop shallow samples and rarefy the rest to exactly `depth` reads.
///
/// A sample whose total count is below `depth` is removed. Every
/// surviving sample is subsampled without replacement: its reads form a
/// multiset of size `total`, from which `depth` reads are drawn and
/// re-tallied per feature.
///
/// # Arguments
/// * `matrix` - Input feature table
/// * `depth` - Per-sample read depth cutoff
/// * `rng` - Seeded generator driving the subsampling
pub fn rarefy_by_depth(
    matrix: &FeatureMatrix,
    depth: u64,
    rng: &mut XorShiftRng,
) -> Result<FeatureMatrix> {
    if depth == 0 {
        return Err(MinetError::InvalidParameter(
            "Depth cutoff must be positive".to_string(),
        ));
    }

    let col_sums = matrix.col_sums();
    let keep: Vec<usize> = (0..matrix.n_samples())
        .filter(|&col| col_sums[col] >= depth)
        .collect();

    if keep.is_empty() {
        return Err(MinetError::EmptyData(format!(
            "No samples reach the depth cutoff of {}",
            depth
        )));
    }

    let n_features = matrix.n_features();
    let mut tri_mat = TriMat::new((n_features, keep.len()));
    let mut sample_ids = Vec::with_capacity(keep.len());

    for (new_col, &old_col) in keep.iter().enumerate() {
        sample_ids.push(matrix.sample_ids()[old_col].clone());

        let column = matrix.col_dense(old_col);
        let total = col_sums[old_col];

        if total == depth {
            // Already at target depth; a full draw is the identity
            for (row, &count) in column.iter().enumerate() {
                if count > 0 {
                    tri_mat.add_triplet(row, new_col, count);
                }
            }
            continue;
        }

        for (row, count) in rarefy_column(&column, total, depth, rng)
            .into_iter()
            .enumerate()
        {
            if count > 0 {
                tri_mat.add_triplet(row, new_col, count);
            }
        }
    }

    FeatureMatrix::new(tri_mat.to_csr(), matrix.feature_ids().to_vec(), sample_ids)
}

/// Subsample one column without replacement.
///
/// Read positions `0..total` are laid out feature by feature; drawing
/// `depth` distinct positions and mapping them back through the running
/// count boundaries tallies the rarefied counts.
fn rarefy_column(column: &[u64], total: u64, depth: u64, rng: &mut XorShiftRng) -> Vec<u64> {
    let mut positions = rng.sample_without_replacement(total, depth as usize);
    positions.sort_unstable();

    let mut rarefied = vec![0u64; column.len()];
    let mut boundary = 0u64;
    let mut pos_iter = positions.into_iter();
    let mut next_pos = pos_iter.next();

    for (row, &count) in column.iter().enumerate() {
        if count == 0 {
            continue;
        }
        boundary += count;
        while let Some(p) = next_pos {
            if p >= boundary {
                break;
            }
            rarefied[row] += 1;
            next_pos = pos_iter.next();
        }
    }
    debug_assert_eq!(rarefied.iter().sum::<u64>(), depth);

    rarefied
}

/// Drop features whose prevalence is at or below the cutoff.
///
/// Prevalence is the fraction of samples with a nonzero count; a feature
/// sitting exactly on the cutoff is removed.
pub fn filter_by_prevalence(matrix: &FeatureMatrix, cutoff: f64) -> Result<FeatureMatrix> {
    if !(0.0..=1.0).contains(&cutoff) {
        return Err(MinetError::InvalidParameter(
            "Prevalence cutoff must be between 0 and 1".to_string(),
        ));
    }

    let prevalence = matrix.prevalence();
    let keep: Vec<usize> = (0..matrix.n_features())
        .filter(|&row| prevalence[row] > cutoff)
        .collect();

    if keep.is_empty() {
        return Err(MinetError::EmptyData(format!(
            "No features pass the prevalence cutoff of {:.1}%",
            cutoff * 100.0
        )));
    }

    matrix.subset_features(&keep)
}

/// Run the full preprocessing chain: rarefaction, then prevalence filtering.
pub fn preprocess(
    matrix: &FeatureMatrix,
    depth: u64,
    prevalence_cutoff: f64,
    seed: u64,
) -> Result<FeatureMatrix> {
    let mut rng = XorShiftRng::new(seed);
    let rarefied = rarefy_by_depth(matrix, depth, &mut rng)?;
    filter_by_prevalence(&rarefied, prevalence_cutoff)
}
