//! micronet - Microbial Interaction Network CLI
//!
//! Command-line interface for pairwise association analysis and network
//! construction.

use clap::{Parser, Subcommand, ValueEnum};
use micronet::assoc::{run_analysis, AnalysisConfig};
use micronet::data::{AssociationTable, FeatureMatrix};
use micronet::error::Result;
use micronet::network::{Network, NetworkThresholds, SignFilter};
use micronet::preprocess::preprocess;
use std::path::PathBuf;

/// CLI-friendly sign filter enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSign {
    /// Keep positive associations
    Positive,
    /// Keep negative associations
    Negative,
    /// Keep associations of either sign
    Any,
}

impl From<CliSign> for SignFilter {
    fn from(sign: CliSign) -> Self {
        match sign {
            CliSign::Positive => SignFilter::Positive,
            CliSign::Negative => SignFilter::Negative,
            CliSign::Any => SignFilter::Any,
        }
    }
}

/// Microbial Interaction Network analysis
#[derive(Parser)]
#[command(name = "micronet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pairwise interaction analysis of a feature table
    Interaction {
        /// Input microbial feature table TSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output association result TSV
        #[arg(short, long)]
        output: PathBuf,

        /// Per-sample read depth cutoff
        #[arg(long, default_value = "10000")]
        depth: u64,

        /// Per-feature prevalence cutoff
        #[arg(long, default_value = "0.1")]
        prevalence: f64,

        /// Skip preprocessing (input is already rarefied and filtered)
        #[arg(long)]
        no_preprocess: bool,

        /// Number of worker threads (default: logical CPUs)
        #[arg(long)]
        workers: Option<usize>,

        /// Number of permutations for the directionality test
        #[arg(long, default_value = "999")]
        permutations: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Significance level for FDR rejection flags
        #[arg(long, default_value = "0.05")]
        alpha: f64,
    },

    /// Build an interaction network from association results
    Network {
        /// Input association result TSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output network file
        #[arg(short, long, default_value = "network.xml")]
        output: PathBuf,

        /// FDR cutoff for co-occurrence (Fisher exact)
        #[arg(long, default_value = "0.05")]
        fdr_cooccurrence: f64,

        /// Sign filter for co-occurrence associations
        #[arg(long, value_enum, default_value = "positive")]
        cooccurrence_type: CliSign,

        /// FDR cutoff for quantitative association (Pearson correlation)
        #[arg(long, default_value = "0.05")]
        fdr_correlation: f64,

        /// Sign filter for quantitative associations
        #[arg(long, value_enum, default_value = "positive")]
        correlation_type: CliSign,

        /// Directionality p-value cutoff
        #[arg(long, default_value = "0.05")]
        directionality_p_value: f64,

        /// Report duplicate nodes and edges on stderr
        #[arg(long)]
        verbose: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Interaction {
            input,
            output,
            depth,
            prevalence,
            no_preprocess,
            workers,
            permutations,
            seed,
            alpha,
        } => cmd_interaction(
            &input,
            &output,
            depth,
            prevalence,
            no_preprocess,
            workers,
            permutations,
            seed,
            alpha,
        ),

        Commands::Network {
            input,
            output,
            fdr_cooccurrence,
            cooccurrence_type,
            fdr_correlation,
            correlation_type,
            directionality_p_value,
            verbose,
        } => {
            let thresholds = NetworkThresholds {
                fdr_cooccurrence,
                fdr_correlation,
                cooccurrence_sign: cooccurrence_type.into(),
                correlation_sign: correlation_type.into(),
                directionality_alpha: directionality_p_value,
            };
            cmd_network(&input, &output, &thresholds, verbose)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Run the pairwise interaction analysis
#[allow(clippy::too_many_arguments)]
fn cmd_interaction(
    input: &PathBuf,
    output: &PathBuf,
    depth: u64,
    prevalence: f64,
    no_preprocess: bool,
    workers: Option<usize>,
    permutations: usize,
    seed: u64,
    alpha: f64,
) -> Result<()> {
    eprintln!("Loading feature table from {:?}...", input);
    let mut matrix = FeatureMatrix::from_tsv(input)?;
    eprintln!(
        "Loaded {} features x {} samples",
        matrix.n_features(),
        matrix.n_samples()
    );

    if !no_preprocess {
        eprintln!(
            "Preprocessing (depth cutoff {}, prevalence cutoff {})...",
            depth, prevalence
        );
        matrix = preprocess(&matrix, depth, prevalence, seed)?;
        eprintln!(
            "Retained {} features x {} samples",
            matrix.n_features(),
            matrix.n_samples()
        );
    }

    let config = AnalysisConfig {
        n_workers: workers.unwrap_or_else(num_cpus::get),
        n_permutations: permutations,
        seed,
        alpha,
    };
    let table = run_analysis(&matrix, &config)?;

    eprintln!("Writing results to {:?}...", output);
    table.write_tsv(output)?;

    eprintln!("Done! {} pairs tested", table.len());
    let n_sig = table
        .records()
        .iter()
        .filter(|r| r.q_fisher.unwrap_or(1.0) <= alpha)
        .count();
    eprintln!("  {} co-occurrences significant at q <= {}", n_sig, alpha);

    Ok(())
}

/// Build and write the interaction network
fn cmd_network(
    input: &PathBuf,
    output: &PathBuf,
    thresholds: &NetworkThresholds,
    verbose: bool,
) -> Result<()> {
    eprintln!("Loading association results from {:?}...", input);
    let table = AssociationTable::from_tsv(input)?;
    eprintln!("Loaded {} associations", table.len());

    let network = Network::from_table(&table, thresholds, verbose)?;
    eprintln!("Number of nodes: {}", network.n_nodes());
    eprintln!("Number of edges: {}", network.n_edges());

    eprintln!("Writing network to {:?}...", output);
    network.write_xgmml(output)?;

    Ok(())
}
