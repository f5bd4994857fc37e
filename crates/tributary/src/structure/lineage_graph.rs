//! Directed graph view of a normalized snapshot.
//!
//! Wraps a `petgraph` [`DiGraph`] whose node indices coincide with the
//! positions of the nodes in the [`NormalizedGraph`], so index order is input
//! order and every traversal stays deterministic.

use std::collections::HashMap;

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use tributary_core::identifier::Id;

use super::NormalizedGraph;

#[derive(Debug)]
pub(crate) struct LineageGraph {
    graph: DiGraph<Id, ()>,
}

impl LineageGraph {
    /// Builds the graph. Every edge of a normalized graph has known endpoints.
    pub(crate) fn from_normalized(normalized: &NormalizedGraph) -> Self {
        let mut graph = DiGraph::with_capacity(normalized.nodes().len(), normalized.edges().len());
        let mut indices = HashMap::with_capacity(normalized.nodes().len());

        for node in normalized.nodes() {
            let idx = graph.add_node(node.id());
            indices.insert(node.id(), idx);
        }

        for edge in normalized.edges() {
            if let (Some(&source), Some(&target)) =
                (indices.get(&edge.source()), indices.get(&edge.target()))
            {
                graph.add_edge(source, target, ());
            }
        }

        Self { graph }
    }

    pub(crate) fn inner(&self) -> &DiGraph<Id, ()> {
        &self.graph
    }

    pub(crate) fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the nodes with no incoming edge, in input order.
    pub(crate) fn roots(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices().filter(|&idx| {
            self.graph
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_none()
        })
    }
}
