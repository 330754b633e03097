//! Microbial Interaction Network (micronet) Library
//!
//! This library computes pairwise statistical associations between
//! microbial features observed across samples and builds a filtered
//! interaction network from the results.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (FeatureMatrix, AssociationTable)
//! - **preprocess**: Depth rarefaction and prevalence filtering
//! - **stats**: Statistical primitives (Fisher exact, Pearson, seeded RNG)
//! - **assoc**: The pairwise association engine (worker pool, per-pair tests)
//! - **correct**: Multiple testing correction (Benjamini-Hochberg)
//! - **network**: Network construction and XGMML serialization
//!
//! # Example
//!
//! ```no_run
//! use micronet::prelude::*;
//!
//! // Load and preprocess a feature table
//! let matrix = FeatureMatrix::from_tsv("feature-table.tsv").unwrap();
//! let matrix = preprocess(&matrix, 10000, 0.1, 42).unwrap();
//!
//! // Pairwise association analysis with FDR-corrected p-values
//! let table = run_analysis(&matrix, &AnalysisConfig::default()).unwrap();
//! table.write_tsv("associations.tsv").unwrap();
//!
//! // Build and serialize the interaction network
//! let network = Network::from_table(&table, &NetworkThresholds::default(), false).unwrap();
//! network.write_xgmml("network.xml").unwrap();
//! ```

pub mod assoc;
pub mod correct;
pub mod data;
pub mod error;
pub mod network;
pub mod preprocess;
pub mod stats;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::assoc::{
        generate_pairs, run_analysis, test_cooccurrence, test_correlation, test_directionality,
        test_pair, AnalysisConfig, CooccurrenceResult, CorrelationResult, DirectionalityResult,
        PairJob, TesterConfig, WorkerPool,
    };
    pub use crate::correct::{correct_bh, correct_table, BhCorrection, PVALUE_COLUMNS};
    pub use crate::data::{
        AssociationRecord, AssociationTable, FeatureMatrix, COLUMNS, FISHER_P_COLUMN,
        PEARSON_P_COLUMN,
    };
    pub use crate::error::{MinetError, Result};
    pub use crate::network::{
        AttrValue, Network, NetworkEdge, NetworkThresholds, SignFilter, XgmmlGraph,
    };
    pub use crate::preprocess::{filter_by_prevalence, preprocess, rarefy_by_depth};
    pub use crate::stats::{fisher_exact, pearson, XorShiftRng};
}
