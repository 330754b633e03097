//! Data structures for microbial association analysis.

mod association;
mod feature_matrix;

pub use association::{
    AssociationRecord, AssociationTable, COLUMNS, FISHER_P_COLUMN, PEARSON_P_COLUMN,
};
pub use feature_matrix::FeatureMatrix;
