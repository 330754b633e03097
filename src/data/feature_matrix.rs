//! Sparse feature table storage for microbial count data.

use crate::error::{MinetError, Result};
use rayon::prelude::*;
use sprs::{CsMat, TriMat};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A sparse count matrix storing feature abundances across samples.
///
/// Rows represent features (taxa/ASVs), columns represent samples.
/// Uses CSR (Compressed Sparse Row) format for efficient row-wise access,
/// which is the dominant pattern in pairwise association testing.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// Sparse matrix in CSR format (features × samples)
    data: CsMat<u64>,
    /// Feature identifiers (row names)
    feature_ids: Vec<String>,
    /// Sample identifiers (column names)
    sample_ids: Vec<String>,
}

impl FeatureMatrix {
    /// Create a new FeatureMatrix from a sparse matrix and identifiers.
    ///
    /// Feature identifiers must be unique and dimensions must match.
    pub fn new(
        data: CsMat<u64>,
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != feature_ids.len() {
            return Err(MinetError::DimensionMismatch {
                expected: nrows,
                actual: feature_ids.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(MinetError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }
        let mut seen = HashSet::with_capacity(feature_ids.len());
        for id in &feature_ids {
            if !seen.insert(id.as_str()) {
                return Err(MinetError::DuplicateFeature(id.clone()));
            }
        }
        Ok(Self {
            data,
            feature_ids,
            sample_ids,
        })
    }

    /// Load a feature table from a TSV file.
    ///
    /// Expected format:
    /// - First row: header with sample IDs (first column is the feature ID header)
    /// - Subsequent rows: feature ID followed by non-negative integer counts
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| MinetError::EmptyData("Empty TSV file".to_string()))??;
        let header: Vec<&str> = header_line.split('\t').collect();
        if header.len() < 2 {
            return Err(MinetError::EmptyData(
                "TSV must have at least one sample".to_string(),
            ));
        }
        let sample_ids: Vec<String> = header[1..].iter().map(|s| s.to_string()).collect();
        let n_samples = sample_ids.len();

        let mut triplets: Vec<(usize, usize, u64)> = Vec::new();
        let mut feature_ids: Vec<String> = Vec::new();

        for (row_idx, line_result) in lines.enumerate() {
            let line = line_result?;
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();

            if fields.len() != n_samples + 1 {
                return Err(MinetError::DimensionMismatch {
                    expected: n_samples + 1,
                    actual: fields.len(),
                });
            }

            let row = feature_ids.len();
            feature_ids.push(fields[0].to_string());

            for (col_idx, value_str) in fields[1..].iter().enumerate() {
                let value: u64 =
                    value_str
                        .trim()
                        .parse()
                        .map_err(|_| MinetError::InvalidCount {
                            value: value_str.to_string(),
                            row: row_idx,
                            col: col_idx,
                        })?;
                if value > 0 {
                    triplets.push((row, col_idx, value));
                }
            }
        }

        let n_features = feature_ids.len();
        if n_features == 0 {
            return Err(MinetError::EmptyData("No features in TSV".to_string()));
        }

        let mut tri_mat = TriMat::new((n_features, n_samples));
        for (row, col, val) in triplets {
            tri_mat.add_triplet(row, col, val);
        }
        let data: CsMat<u64> = tri_mat.to_csr();

        Self::new(data, feature_ids, sample_ids)
    }

    /// Write the feature table to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "feature_id")?;
        for sample_id in &self.sample_ids {
            write!(writer, "\t{}", sample_id)?;
        }
        writeln!(writer)?;

        for (row_idx, feature_id) in self.feature_ids.iter().enumerate() {
            write!(writer, "{}", feature_id)?;
            for col_idx in 0..self.n_samples() {
                write!(writer, "\t{}", self.get(row_idx, col_idx))?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    /// Get the value at (row, col), returning 0 for missing entries.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.data.get(row, col).copied().unwrap_or(0)
    }

    /// Number of features (rows).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.data.rows()
    }

    /// Number of samples (columns).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.cols()
    }

    /// Feature identifiers.
    #[inline]
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get a dense count vector for a specific row (feature).
    pub fn row_dense(&self, row: usize) -> Vec<u64> {
        let mut dense = vec![0u64; self.n_samples()];
        if let Some(row_vec) = self.data.outer_view(row) {
            for (col, &val) in row_vec.iter() {
                dense[col] = val;
            }
        }
        dense
    }

    /// Number of samples in which a feature has a nonzero count.
    pub fn row_nnz(&self, row: usize) -> usize {
        self.data.outer_view(row).map(|v| v.nnz()).unwrap_or(0)
    }

    /// Compute column sums (read depth per sample).
    pub fn col_sums(&self) -> Vec<u64> {
        let mut sums = vec![0u64; self.n_samples()];
        for row_vec in self.data.outer_iterator() {
            for (col, &val) in row_vec.iter() {
                sums[col] += val;
            }
        }
        sums
    }

    /// Per-feature prevalence (fraction of samples with nonzero counts).
    pub fn prevalence(&self) -> Vec<f64> {
        let n_samples = self.n_samples() as f64;
        (0..self.n_features())
            .into_par_iter()
            .map(|row| self.row_nnz(row) as f64 / n_samples)
            .collect()
    }

    /// Subset the matrix to the specified features (by index).
    pub fn subset_features(&self, indices: &[usize]) -> Result<Self> {
        let n_features = indices.len();
        let n_samples = self.n_samples();

        let mut tri_mat = TriMat::new((n_features, n_samples));
        let mut new_feature_ids = Vec::with_capacity(n_features);

        for (new_row, &old_row) in indices.iter().enumerate() {
            if old_row >= self.n_features() {
                return Err(MinetError::InvalidParameter(format!(
                    "Feature index {} out of bounds",
                    old_row
                )));
            }
            new_feature_ids.push(self.feature_ids[old_row].clone());

            if let Some(row_vec) = self.data.outer_view(old_row) {
                for (col, &val) in row_vec.iter() {
                    tri_mat.add_triplet(new_row, col, val);
                }
            }
        }

        Self::new(tri_mat.to_csr(), new_feature_ids, self.sample_ids.clone())
    }

    /// Subset the matrix to the specified samples (by index).
    pub fn subset_samples(&self, indices: &[usize]) -> Result<Self> {
        let n_features = self.n_features();
        let n_samples = indices.len();

        let mut new_sample_ids = Vec::with_capacity(n_samples);
        for &old_col in indices {
            if old_col >= self.n_samples() {
                return Err(MinetError::InvalidParameter(format!(
                    "Sample index {} out of bounds",
                    old_col
                )));
            }
            new_sample_ids.push(self.sample_ids[old_col].clone());
        }

        let col_map: std::collections::HashMap<usize, usize> = indices
            .iter()
            .enumerate()
            .map(|(new_idx, &old_idx)| (old_idx, new_idx))
            .collect();

        let mut tri_mat = TriMat::new((n_features, n_samples));
        for (row, row_vec) in self.data.outer_iterator().enumerate() {
            for (old_col, &val) in row_vec.iter() {
                if let Some(&new_col) = col_map.get(&old_col) {
                    tri_mat.add_triplet(row, new_col, val);
                }
            }
        }

        Self::new(tri_mat.to_csr(), self.feature_ids.clone(), new_sample_ids)
    }

    /// Get a dense count vector for a specific column (sample).
    pub fn col_dense(&self, col: usize) -> Vec<u64> {
        (0..self.n_features())
            .map(|row| self.get(row, col))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as IoWrite;
    use tempfile::NamedTempFile;

    fn create_test_matrix() -> FeatureMatrix {
        // 3 features × 4 samples
        let mut tri_mat = TriMat::new((3, 4));
        tri_mat.add_triplet(0, 0, 10);
        tri_mat.add_triplet(0, 1, 20);
        tri_mat.add_triplet(0, 3, 5);
        tri_mat.add_triplet(1, 0, 100);
        tri_mat.add_triplet(1, 1, 200);
        tri_mat.add_triplet(1, 2, 150);
        tri_mat.add_triplet(1, 3, 175);
        tri_mat.add_triplet(2, 0, 1);

        let feature_ids = vec!["asv_A".to_string(), "asv_B".to_string(), "asv_C".to_string()];
        let sample_ids = vec![
            "sample1".to_string(),
            "sample2".to_string(),
            "sample3".to_string(),
            "sample4".to_string(),
        ];

        FeatureMatrix::new(tri_mat.to_csr(), feature_ids, sample_ids).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let mat = create_test_matrix();
        assert_eq!(mat.n_features(), 3);
        assert_eq!(mat.n_samples(), 4);
    }

    #[test]
    fn test_get_values() {
        let mat = create_test_matrix();
        assert_eq!(mat.get(0, 0), 10);
        assert_eq!(mat.get(0, 2), 0);
        assert_eq!(mat.get(2, 0), 1);
        assert_eq!(mat.get(2, 1), 0);
    }

    #[test]
    fn test_row_dense() {
        let mat = create_test_matrix();
        assert_eq!(mat.row_dense(0), vec![10, 20, 0, 5]);
        assert_eq!(mat.row_dense(2), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_row_nnz_and_prevalence() {
        let mat = create_test_matrix();
        assert_eq!(mat.row_nnz(0), 3);
        assert_eq!(mat.row_nnz(1), 4);
        assert_eq!(mat.row_nnz(2), 1);

        let prev = mat.prevalence();
        assert_eq!(prev, vec![0.75, 1.0, 0.25]);
    }

    #[test]
    fn test_col_sums() {
        let mat = create_test_matrix();
        assert_eq!(mat.col_sums(), vec![111, 220, 150, 180]);
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let tri_mat = TriMat::new((2, 2));
        let result = FeatureMatrix::new(
            tri_mat.to_csr(),
            vec!["same".to_string(), "same".to_string()],
            vec!["s1".to_string(), "s2".to_string()],
        );
        assert!(matches!(result, Err(MinetError::DuplicateFeature(_))));
    }

    #[test]
    fn test_tsv_roundtrip() {
        let mat = create_test_matrix();

        let temp_file = NamedTempFile::new().unwrap();
        mat.to_tsv(temp_file.path()).unwrap();

        let loaded = FeatureMatrix::from_tsv(temp_file.path()).unwrap();
        assert_eq!(loaded.n_features(), mat.n_features());
        assert_eq!(loaded.n_samples(), mat.n_samples());
        assert_eq!(loaded.feature_ids(), mat.feature_ids());
        assert_eq!(loaded.sample_ids(), mat.sample_ids());

        for row in 0..mat.n_features() {
            for col in 0..mat.n_samples() {
                assert_eq!(loaded.get(row, col), mat.get(row, col));
            }
        }
    }

    #[test]
    fn test_from_tsv_rejects_bad_count() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "feature_id\ts1\ts2").unwrap();
        writeln!(file, "asv_1\t3\tnot_a_number").unwrap();
        file.flush().unwrap();

        let result = FeatureMatrix::from_tsv(file.path());
        assert!(matches!(result, Err(MinetError::InvalidCount { .. })));
    }

    #[test]
    fn test_from_tsv_rejects_ragged_row() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "feature_id\ts1\ts2\ts3").unwrap();
        writeln!(file, "asv_1\t3\t4").unwrap();
        file.flush().unwrap();

        let result = FeatureMatrix::from_tsv(file.path());
        assert!(matches!(result, Err(MinetError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_subset_features() {
        let mat = create_test_matrix();
        let subset = mat.subset_features(&[0, 2]).unwrap();

        assert_eq!(subset.n_features(), 2);
        assert_eq!(subset.n_samples(), 4);
        assert_eq!(subset.feature_ids(), &["asv_A", "asv_C"]);
        assert_eq!(subset.get(0, 0), 10);
        assert_eq!(subset.get(1, 0), 1);
    }

    #[test]
    fn test_subset_samples() {
        let mat = create_test_matrix();
        let subset = mat.subset_samples(&[1, 3]).unwrap();

        assert_eq!(subset.n_features(), 3);
        assert_eq!(subset.n_samples(), 2);
        assert_eq!(subset.sample_ids(), &["sample2", "sample4"]);
        assert_eq!(subset.get(0, 0), 20);
        assert_eq!(subset.get(0, 1), 5);
    }

    #[test]
    fn test_col_dense() {
        let mat = create_test_matrix();
        assert_eq!(mat.col_dense(0), vec![10, 100, 1]);
        assert_eq!(mat.col_dense(2), vec![0, 150, 0]);
    }
}
