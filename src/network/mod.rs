//! Interaction network construction from an association table.
//!
//! Rows passing the FDR and sign thresholds contribute nodes; the
//! directionality p-values decide which directed edges appear.

pub mod xgmml;

pub use xgmml::{AttrValue, XgmmlGraph};

use crate::data::AssociationTable;
use crate::error::{MinetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Sign filter for an association statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignFilter {
    /// Keep rows with a positive statistic.
    Positive,
    /// Keep rows with a negative statistic.
    Negative,
    /// Keep rows regardless of sign.
    Any,
}

impl SignFilter {
    fn passes(&self, value: f64) -> bool {
        match self {
            SignFilter::Positive => value > 0.0,
            SignFilter::Negative => value < 0.0,
            SignFilter::Any => true,
        }
    }
}

/// Thresholds controlling which associations enter the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkThresholds {
    /// FDR cutoff on the adjusted Fisher exact p-value.
    pub fdr_cooccurrence: f64,
    /// FDR cutoff on the adjusted Pearson p-value.
    pub fdr_correlation: f64,
    /// Sign filter on the log odds ratio.
    pub cooccurrence_sign: SignFilter,
    /// Sign filter on the correlation coefficient.
    pub correlation_sign: SignFilter,
    /// Cutoff on the directional permutation p-values.
    pub directionality_alpha: f64,
}

impl Default for NetworkThresholds {
    fn default() -> Self {
        Self {
            fdr_cooccurrence: 0.05,
            fdr_correlation: 0.05,
            cooccurrence_sign: SignFilter::Positive,
            correlation_sign: SignFilter::Positive,
            directionality_alpha: 0.05,
        }
    }
}

/// A directed edge of the interaction network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,
    pub rho: f64,
    pub log_odds_ratio: f64,
}

/// A filtered microbial interaction network.
#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<String>,
    edges: Vec<NetworkEdge>,
    verbose: bool,
}

impl Network {
    /// Build a network from a corrected association table.
    ///
    /// Every record must carry adjusted p-values; a row passes when both
    /// adjusted p-values fall below their cutoffs and both sign filters
    /// match. For each passing row, `P-value(12)` below the
    /// directionality cutoff adds the edge feature1 -> feature2 and
    /// `P-value(21)` the reverse edge.
    ///
    /// `verbose` enables duplicate warnings during graph serialization.
    pub fn from_table(
        table: &AssociationTable,
        thresholds: &NetworkThresholds,
        verbose: bool,
    ) -> Result<Self> {
        let mut nodes = Vec::new();
        let mut node_set = HashSet::new();
        let mut edges = Vec::new();
        let mut edge_set = HashSet::new();

        for record in table.records() {
            let q_fisher = record.q_fisher.ok_or(MinetError::MissingAdjusted)?;
            let q_pearson = record.q_pearson.ok_or(MinetError::MissingAdjusted)?;

            if q_fisher >= thresholds.fdr_cooccurrence || q_pearson >= thresholds.fdr_correlation {
                continue;
            }
            if !thresholds.cooccurrence_sign.passes(record.log_odds_ratio) {
                continue;
            }
            if !thresholds.correlation_sign.passes(record.rho) {
                continue;
            }

            for id in [&record.feature1, &record.feature2] {
                if node_set.insert(id.clone()) {
                    nodes.push(id.clone());
                }
            }

            let mut push_edge = |source: &str, target: &str| {
                let key = (source.to_string(), target.to_string());
                if edge_set.insert(key) {
                    edges.push(NetworkEdge {
                        source: source.to_string(),
                        target: target.to_string(),
                        rho: record.rho,
                        log_odds_ratio: record.log_odds_ratio,
                    });
                }
            };
            if record.p12 < thresholds.directionality_alpha {
                push_edge(&record.feature1, &record.feature2);
            }
            if record.p21 < thresholds.directionality_alpha {
                push_edge(&record.feature2, &record.feature1);
            }
        }

        Ok(Self {
            nodes,
            edges,
            verbose,
        })
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// Node identifiers in insertion order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Directed edges in insertion order.
    pub fn edges(&self) -> &[NetworkEdge] {
        &self.edges
    }

    /// Serialize the network to an XGMML file.
    pub fn write_xgmml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let graph = self.to_graph();
        graph.write(path)
    }

    fn to_graph(&self) -> XgmmlGraph {
        let mut graph = XgmmlGraph::new("graph", self.verbose);
        for id in &self.nodes {
            graph.add_node(id, vec![("name".to_string(), AttrValue::Text(id.clone()))]);
        }
        for edge in &self.edges {
            graph.add_edge(
                &edge.source,
                &edge.target,
                vec![
                    ("Rho".to_string(), AttrValue::Real(edge.rho)),
                    (
                        "LogOddsRatio".to_string(),
                        AttrValue::Real(edge.log_odds_ratio),
                    ),
                ],
            );
        }
        graph
    }
}
