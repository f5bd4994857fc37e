//! Graph normalization.
//!
//! Raw snapshots routinely repeat nodes and edges, and occasionally carry
//! edges whose endpoints are not in the snapshot at all. [`normalize`]
//! collapses the repeats and drops the dangling edges, recording a
//! [`LayoutWarning`] for every problem it fixes.
//!
//! Both nodes and edges are deduplicated first-seen-wins: the first
//! occurrence keeps its value and its position in input order.

use std::{collections::HashSet, fmt};

use indexmap::{IndexMap, map::Entry};
use serde::Serialize;

use tributary_core::{
    identifier::Id,
    lineage::{LineageEdge, LineageNode, LineageVersion},
};

use crate::config::EdgeIdentity;

/// Which endpoints of a dangling edge are unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEndpoint {
    Source,
    Target,
    Both,
}

/// A non-fatal data-integrity problem found while normalizing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// A node had an empty or whitespace-only id and was skipped.
    BlankNodeId { index: usize },

    /// A node id appeared more than once; later occurrences were ignored.
    DuplicateNode { id: Id },

    /// An edge referenced a node that is not in the snapshot and was dropped.
    DanglingEdge {
        source: Id,
        target: Id,
        missing: MissingEndpoint,
    },

    /// The version history lists a version more than once. The history is
    /// kept as reported.
    RepeatedVersion { version: u32 },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::BlankNodeId { index } => {
                write!(f, "node at index {index} has a blank id; skipping it")
            }
            LayoutWarning::DuplicateNode { id } => {
                write!(f, "node `{id}` is defined more than once; keeping the first")
            }
            LayoutWarning::DanglingEdge {
                source,
                target,
                missing,
            } => {
                let unknown = match missing {
                    MissingEndpoint::Source => format!("`{source}`"),
                    MissingEndpoint::Target => format!("`{target}`"),
                    MissingEndpoint::Both => format!("`{source}` and `{target}`"),
                };
                write!(
                    f,
                    "edge `{source}` -> `{target}` dropped: unknown node {unknown}"
                )
            }
            LayoutWarning::RepeatedVersion { version } => {
                write!(f, "version {version} appears more than once in the history")
            }
        }
    }
}

/// A deduplicated graph whose edges all reference its nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedGraph {
    nodes: Vec<LineageNode>,
    edges: Vec<LineageEdge>,
    warnings: Vec<LayoutWarning>,
}

impl NormalizedGraph {
    pub fn nodes(&self) -> &[LineageNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LineageEdge] {
        &self.edges
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    pub(crate) fn into_parts(self) -> (Vec<LineageNode>, Vec<LineageEdge>, Vec<LayoutWarning>) {
        (self.nodes, self.edges, self.warnings)
    }
}

#[derive(PartialEq, Eq, Hash)]
struct EdgeKey<'a> {
    source: Id,
    target: Id,
    logic: Option<&'a str>,
}

impl<'a> EdgeKey<'a> {
    fn new(edge: &'a LineageEdge, identity: EdgeIdentity) -> Self {
        let logic = match identity {
            EdgeIdentity::Endpoints => None,
            EdgeIdentity::EndpointsAndLogic => edge.transformation_logic(),
        };
        Self {
            source: edge.source(),
            target: edge.target(),
            logic,
        }
    }
}

/// Drops nodes with blank ids, deduplicates nodes by id and edges by
/// `identity`, then drops edges whose endpoints are unknown.
///
/// Pure and idempotent: normalizing the nodes and edges of a
/// [`NormalizedGraph`] again yields the same graph and no warnings.
///
/// # Examples
///
/// ```
/// # use tributary::{config::EdgeIdentity, structure::normalize};
/// # use tributary_core::{identifier::Id, lineage::{LineageEdge, LineageNode, NodeRole}};
/// let a = Id::new("A");
/// let b = Id::new("B");
/// let nodes = vec![
///     LineageNode::new(a, NodeRole::Source, "A"),
///     LineageNode::new(b, NodeRole::Target, "B"),
/// ];
/// let edges = vec![LineageEdge::new(a, b), LineageEdge::new(a, b)];
///
/// let graph = normalize(&nodes, &edges, EdgeIdentity::Endpoints);
/// assert_eq!(graph.edges().len(), 1);
/// assert!(graph.warnings().is_empty());
/// ```
pub fn normalize(
    nodes: &[LineageNode],
    edges: &[LineageEdge],
    identity: EdgeIdentity,
) -> NormalizedGraph {
    let mut warnings = Vec::new();

    let mut unique_nodes: IndexMap<Id, &LineageNode> = IndexMap::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        if node.id().to_string().trim().is_empty() {
            warnings.push(LayoutWarning::BlankNodeId { index });
            continue;
        }
        match unique_nodes.entry(node.id()) {
            Entry::Vacant(entry) => {
                entry.insert(node);
            }
            Entry::Occupied(_) => warnings.push(LayoutWarning::DuplicateNode { id: node.id() }),
        }
    }

    let mut unique_edges: IndexMap<EdgeKey<'_>, &LineageEdge> =
        IndexMap::with_capacity(edges.len());
    for edge in edges {
        unique_edges.entry(EdgeKey::new(edge, identity)).or_insert(edge);
    }

    let mut kept_edges = Vec::with_capacity(unique_edges.len());
    for edge in unique_edges.into_values() {
        let has_source = unique_nodes.contains_key(&edge.source());
        let has_target = unique_nodes.contains_key(&edge.target());
        let missing = match (has_source, has_target) {
            (true, true) => {
                kept_edges.push(edge.clone());
                continue;
            }
            (false, true) => MissingEndpoint::Source,
            (true, false) => MissingEndpoint::Target,
            (false, false) => MissingEndpoint::Both,
        };
        warnings.push(LayoutWarning::DanglingEdge {
            source: edge.source(),
            target: edge.target(),
            missing,
        });
    }

    NormalizedGraph {
        nodes: unique_nodes.into_values().cloned().collect(),
        edges: kept_edges,
        warnings,
    }
}

/// Reports every version listed more than once in `versions`, once each,
/// in order of first repetition.
pub fn check_versions(versions: &[LineageVersion]) -> Vec<LayoutWarning> {
    let mut seen = HashSet::with_capacity(versions.len());
    let mut reported = HashSet::new();
    versions
        .iter()
        .map(LineageVersion::version)
        .filter(|&version| !seen.insert(version) && reported.insert(version))
        .map(|version| LayoutWarning::RepeatedVersion { version })
        .collect()
}
