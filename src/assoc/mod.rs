//! Pairwise association engine.
//!
//! The coordinator enumerates all unordered feature pairs, dispatches
//! them to a fixed worker pool, collects one record per pair, and
//! finishes with independent FDR correction of the Fisher and Pearson
//! p-value columns.

pub mod cooccurrence;
pub mod correlation;
pub mod directionality;
pub mod pair;
pub mod pool;
pub mod tester;

pub use cooccurrence::{test_cooccurrence, CooccurrenceResult};
pub use correlation::{test_correlation, CorrelationResult};
pub use directionality::{test_directionality, DirectionalityResult};
pub use pair::{generate_pairs, PairJob};
pub use pool::WorkerPool;
pub use tester::{test_pair, TesterConfig};

use crate::correct::correct_table;
use crate::data::{AssociationTable, FeatureMatrix, FISHER_P_COLUMN, PEARSON_P_COLUMN};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Configuration for a full association analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of worker threads.
    pub n_workers: usize,
    /// Number of permutations for the directionality null.
    pub n_permutations: usize,
    /// Base random seed.
    pub seed: u64,
    /// Significance level for the BH rejection flags.
    pub alpha: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_workers: num_cpus::get(),
            n_permutations: 999,
            seed: 42,
            alpha: 0.05,
        }
    }
}

impl AnalysisConfig {
    fn tester(&self) -> TesterConfig {
        TesterConfig {
            n_permutations: self.n_permutations,
            seed: self.seed,
        }
    }
}

/// Run the pairwise association analysis over a feature matrix.
///
/// Produces one record per unordered feature pair, in pair-enumeration
/// order, with both adjusted-p columns filled in.
pub fn run_analysis(matrix: &FeatureMatrix, config: &AnalysisConfig) -> Result<AssociationTable> {
    let jobs = generate_pairs(matrix);
    let n_jobs = jobs.len();
    eprintln!("Number of jobs: {}", n_jobs);

    let pool = WorkerPool::start(config.n_workers, config.tester())?;
    eprintln!("{} workers deployed", pool.n_workers());

    for job in jobs {
        pool.submit(job)?;
    }
    let records = pool.shutdown_and_collect(n_jobs)?;

    let mut table = AssociationTable::new(records);

    let fisher = correct_table(&table, Some(FISHER_P_COLUMN), config.alpha)?;
    table.set_adjusted_fisher(fisher.q_values)?;

    let pearson = correct_table(&table, Some(PEARSON_P_COLUMN), config.alpha)?;
    table.set_adjusted_pearson(pearson.q_values)?;

    Ok(table)
}
