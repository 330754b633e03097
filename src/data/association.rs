//! Association records and the pairwise result table.

use crate::error::{MinetError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Column header for the Fisher exact p-value.
pub const FISHER_P_COLUMN: &str = "P-value(FisherExact)";
/// Column header for the Pearson correlation p-value.
pub const PEARSON_P_COLUMN: &str = "P-value(Pearson)";

/// Full column set of the association output table, in order.
pub const COLUMNS: [&str; 15] = [
    "Feature1",
    "Feature2",
    "N12",
    "N1",
    "N2",
    "LogOddsRatio",
    "Rho",
    FISHER_P_COLUMN,
    PEARSON_P_COLUMN,
    "LogRatio12",
    "LogRatio21",
    "P-value(12)",
    "P-value(21)",
    "Adjusted-P(FisherExact)",
    "Adjusted-P(Pearson)",
];

/// Pairwise association statistics for one feature pair.
///
/// The raw statistics are immutable once a worker emits the record; the
/// FDR step only fills in the two adjusted-p fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationRecord {
    /// First feature identifier.
    pub feature1: String,
    /// Second feature identifier.
    pub feature2: String,
    /// Number of samples where both features are present.
    pub n12: usize,
    /// Number of samples where feature 1 is present.
    pub n1: usize,
    /// Number of samples where feature 2 is present.
    pub n2: usize,
    /// Log2 of the observed/expected co-occurrence ratio.
    pub log_odds_ratio: f64,
    /// Pearson correlation of log counts over co-occurring samples.
    pub rho: f64,
    /// Two-sided Fisher exact p-value for co-occurrence.
    pub p_fisher: f64,
    /// Two-sided p-value for the correlation.
    pub p_pearson: f64,
    /// Directional log-ratio statistic, feature1 -> feature2.
    pub lr12: f64,
    /// Directional log-ratio statistic, feature2 -> feature1.
    pub lr21: f64,
    /// Permutation p-value for `lr12`.
    pub p12: f64,
    /// Permutation p-value for `lr21`.
    pub p21: f64,
    /// BH-adjusted Fisher exact p-value.
    pub q_fisher: Option<f64>,
    /// BH-adjusted Pearson p-value.
    pub q_pearson: Option<f64>,
}

/// Ordered collection of association records.
///
/// Records are kept in pair-enumeration order regardless of the order in
/// which workers completed them.
#[derive(Debug, Clone, Default)]
pub struct AssociationTable {
    records: Vec<AssociationRecord>,
}

impl AssociationTable {
    /// Create a table from records already in pair order.
    pub fn new(records: Vec<AssociationRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in pair order.
    pub fn records(&self) -> &[AssociationRecord] {
        &self.records
    }

    /// Extract a numeric column by header name.
    ///
    /// Returns `None` for unknown names and for the non-numeric feature
    /// identifier columns. Unset adjusted values surface as NaN.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let extract: fn(&AssociationRecord) -> f64 = match name {
            "N12" => |r| r.n12 as f64,
            "N1" => |r| r.n1 as f64,
            "N2" => |r| r.n2 as f64,
            "LogOddsRatio" => |r| r.log_odds_ratio,
            "Rho" => |r| r.rho,
            FISHER_P_COLUMN => |r| r.p_fisher,
            PEARSON_P_COLUMN => |r| r.p_pearson,
            "LogRatio12" => |r| r.lr12,
            "LogRatio21" => |r| r.lr21,
            "P-value(12)" => |r| r.p12,
            "P-value(21)" => |r| r.p21,
            "Adjusted-P(FisherExact)" => |r| r.q_fisher.unwrap_or(f64::NAN),
            "Adjusted-P(Pearson)" => |r| r.q_pearson.unwrap_or(f64::NAN),
            _ => return None,
        };
        Some(self.records.iter().map(extract).collect())
    }

    /// Attach BH-adjusted Fisher p-values, one per record.
    pub fn set_adjusted_fisher(&mut self, q_values: Vec<f64>) -> Result<()> {
        if q_values.len() != self.records.len() {
            return Err(MinetError::DimensionMismatch {
                expected: self.records.len(),
                actual: q_values.len(),
            });
        }
        for (record, q) in self.records.iter_mut().zip(q_values) {
            record.q_fisher = Some(q);
        }
        Ok(())
    }

    /// Attach BH-adjusted Pearson p-values, one per record.
    pub fn set_adjusted_pearson(&mut self, q_values: Vec<f64>) -> Result<()> {
        if q_values.len() != self.records.len() {
            return Err(MinetError::DimensionMismatch {
                expected: self.records.len(),
                actual: q_values.len(),
            });
        }
        for (record, q) in self.records.iter_mut().zip(q_values) {
            record.q_pearson = Some(q);
        }
        Ok(())
    }

    /// Write the table to a TSV file with the canonical column set.
    pub fn write_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", COLUMNS.join("\t"))?;

        for r in &self.records {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                r.feature1,
                r.feature2,
                r.n12,
                r.n1,
                r.n2,
                r.log_odds_ratio,
                r.rho,
                r.p_fisher,
                r.p_pearson,
                r.lr12,
                r.lr21,
                r.p12,
                r.p21,
                format_adjusted(r.q_fisher),
                format_adjusted(r.q_pearson),
            )?;
        }

        Ok(())
    }

    /// Read an association table from a TSV file.
    ///
    /// The header must carry the canonical column names; numeric cells
    /// that fail to parse are reported with their column and row.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| MinetError::EmptyData("Empty association table".to_string()))??;
        let header: Vec<&str> = header_line.split('\t').collect();
        if header != COLUMNS {
            return Err(MinetError::InvalidParameter(format!(
                "Unexpected association table header: {}",
                header_line
            )));
        }

        let mut records = Vec::new();
        for (row_idx, line_result) in lines.enumerate() {
            let line = line_result?;
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != COLUMNS.len() {
                return Err(MinetError::DimensionMismatch {
                    expected: COLUMNS.len(),
                    actual: fields.len(),
                });
            }

            records.push(AssociationRecord {
                feature1: fields[0].to_string(),
                feature2: fields[1].to_string(),
                n12: parse_usize(fields[2], COLUMNS[2], row_idx)?,
                n1: parse_usize(fields[3], COLUMNS[3], row_idx)?,
                n2: parse_usize(fields[4], COLUMNS[4], row_idx)?,
                log_odds_ratio: parse_f64(fields[5], COLUMNS[5], row_idx)?,
                rho: parse_f64(fields[6], COLUMNS[6], row_idx)?,
                p_fisher: parse_f64(fields[7], COLUMNS[7], row_idx)?,
                p_pearson: parse_f64(fields[8], COLUMNS[8], row_idx)?,
                lr12: parse_f64(fields[9], COLUMNS[9], row_idx)?,
                lr21: parse_f64(fields[10], COLUMNS[10], row_idx)?,
                p12: parse_f64(fields[11], COLUMNS[11], row_idx)?,
                p21: parse_f64(fields[12], COLUMNS[12], row_idx)?,
                q_fisher: parse_adjusted(fields[13], COLUMNS[13], row_idx)?,
                q_pearson: parse_adjusted(fields[14], COLUMNS[14], row_idx)?,
            });
        }

        Ok(Self::new(records))
    }
}

fn format_adjusted(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "NA".to_string(),
    }
}

fn parse_f64(value: &str, column: &str, row: usize) -> Result<f64> {
    value.trim().parse().map_err(|_| MinetError::InvalidValue {
        value: value.to_string(),
        column: column.to_string(),
        row,
    })
}

fn parse_usize(value: &str, column: &str, row: usize) -> Result<usize> {
    value.trim().parse().map_err(|_| MinetError::InvalidValue {
        value: value.to_string(),
        column: column.to_string(),
        row,
    })
}

fn parse_adjusted(value: &str, column: &str, row: usize) -> Result<Option<f64>> {
    if value.trim() == "NA" {
        return Ok(None);
    }
    parse_f64(value, column, row).map(Some)
}
