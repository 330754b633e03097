//! XGMML graph serialization with typed attributes.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A typed attribute value, chosen at construction time.
///
/// The serialized XGMML `type` field is determined by the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl AttrValue {
    /// XGMML type name for this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Integer(_) => "integer",
            AttrValue::Real(_) => "real",
            AttrValue::Text(_) => "string",
        }
    }

    fn format_value(&self) -> String {
        match self {
            AttrValue::Integer(v) => v.to_string(),
            AttrValue::Real(v) => format!("{:.6}", v),
            AttrValue::Text(v) => v.clone(),
        }
    }
}

/// A graph node with an identifier and typed attributes.
#[derive(Debug, Clone)]
pub struct XgmmlNode {
    pub id: String,
    pub attrs: Vec<(String, AttrValue)>,
}

/// A directed edge between two node identifiers.
#[derive(Debug, Clone)]
pub struct XgmmlEdge {
    pub source: String,
    pub target: String,
    pub attrs: Vec<(String, AttrValue)>,
}

/// A directed graph serializable to XGMML.
///
/// Duplicate nodes and edges are skipped; with `verbose` set the skip is
/// reported on stderr. Edges whose endpoints are unknown are always
/// reported and dropped, since a silently missing edge is harder to
/// debug than a noisy one.
#[derive(Debug)]
pub struct XgmmlGraph {
    name: String,
    verbose: bool,
    nodes: Vec<XgmmlNode>,
    edges: Vec<XgmmlEdge>,
    node_ids: HashSet<String>,
    edge_keys: HashSet<(String, String)>,
}

impl XgmmlGraph {
    /// Create an empty graph.
    pub fn new(name: impl Into<String>, verbose: bool) -> Self {
        Self {
            name: name.into(),
            verbose,
            nodes: Vec::new(),
            edges: Vec::new(),
            node_ids: HashSet::new(),
            edge_keys: HashSet::new(),
        }
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// Add a node; duplicates are skipped.
    pub fn add_node(&mut self, id: impl Into<String>, attrs: Vec<(String, AttrValue)>) {
        let id = id.into();
        if !self.node_ids.insert(id.clone()) {
            if self.verbose {
                eprintln!("Warning: the node {} is already present", id);
            }
            return;
        }
        self.nodes.push(XgmmlNode { id, attrs });
    }

    /// Add a directed edge; both endpoints must already be nodes.
    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        attrs: Vec<(String, AttrValue)>,
    ) {
        let source = source.into();
        let target = target.into();

        if !self.node_ids.contains(&source) || !self.node_ids.contains(&target) {
            eprintln!(
                "Warning: the nodes in the edge not found; dropping ({}, {})",
                source, target
            );
            return;
        }
        let key = (source.clone(), target.clone());
        if !self.edge_keys.insert(key) {
            if self.verbose {
                eprintln!("Warning: the edge ({}, {}) is already present", source, target);
            }
            return;
        }
        self.edges.push(XgmmlEdge {
            source,
            target,
            attrs,
        });
    }

    /// Render the graph as an XGMML document.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\" ?>\n");
        out.push_str(&format!(
            "<graph directed=\"1\" id=\"42\" label=\"{}\" xmlns=\"http://www.cs.rpi.edu/XGMML\">\n",
            escape(&self.name)
        ));

        for node in &self.nodes {
            let label = node
                .attrs
                .iter()
                .find(|(name, _)| name == "label")
                .map(|(_, value)| value.format_value())
                .unwrap_or_else(|| node.id.clone());
            out.push_str(&format!(
                "<node id=\"{}\" label=\"{}\">\n",
                escape(&node.id),
                escape(&label)
            ));
            for (name, value) in &node.attrs {
                out.push_str(&format_att(&name.to_lowercase(), value));
            }
            out.push_str("</node>\n");
        }

        for edge in &self.edges {
            let label = edge
                .attrs
                .iter()
                .find(|(name, _)| name == "label")
                .map(|(_, value)| value.format_value())
                .unwrap_or_else(|| "gg".to_string());
            out.push_str(&format!(
                "<edge source=\"{}\" target=\"{}\" label=\"{}\">\n",
                escape(&edge.source),
                escape(&edge.target),
                escape(&label)
            ));
            for (name, value) in &edge.attrs {
                out.push_str(&format_att(name, value));
            }
            out.push_str("</edge>\n");
        }

        out.push_str("</graph>\n");
        out
    }

    /// Write the XGMML document to a file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.to_xml().as_bytes())?;
        Ok(())
    }
}

fn format_att(name: &str, value: &AttrValue) -> String {
    format!(
        "<att name=\"{}\" type=\"{}\" value=\"{}\"/>\n",
        escape(name),
        value.type_name(),
        escape(&value.format_value())
    )
}

/// Minimal XML attribute escaping.
fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
