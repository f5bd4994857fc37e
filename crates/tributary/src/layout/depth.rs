//! Topological leveling.
//!
//! Each node gets a depth: the length of the longest path reaching it from a
//! root. Depth is the column a node is drawn in, so every node sits to the
//! right of all its ancestors.
//!
//! Lineage graphs are not guaranteed to be acyclic. Strongly connected
//! components are collapsed first and the longest path is taken over the
//! resulting acyclic condensation; all members of a cycle share one depth,
//! and a cycle nothing flows into starts at depth 0.

use log::debug;
use petgraph::algo::tarjan_scc;

use crate::structure::LineageGraph;

/// Depth of every node, indexed by input position, plus the nodes of each
/// depth in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Depths {
    depths: Vec<usize>,
    columns: Vec<Vec<usize>>,
}

impl Depths {
    /// Depth of the node at input position `idx`.
    pub(crate) fn depth(&self, idx: usize) -> Option<usize> {
        self.depths.get(idx).copied()
    }

    /// Node positions grouped by depth. Column `d` holds the nodes of depth
    /// `d` in input order; no column is empty.
    pub(crate) fn columns(&self) -> &[Vec<usize>] {
        &self.columns
    }
}

pub(crate) fn assign_depths(graph: &LineageGraph) -> Depths {
    let inner = graph.inner();
    let node_count = graph.node_count();

    // Components come back in reverse topological order.
    let components = tarjan_scc(inner);

    let mut component_of = vec![0; node_count];
    for (component_idx, members) in components.iter().enumerate() {
        for member in members {
            component_of[member.index()] = component_idx;
        }
    }

    let mut component_depth = vec![0usize; components.len()];
    for (component_idx, members) in components.iter().enumerate().rev() {
        let depth = component_depth[component_idx];
        for &member in members {
            for successor in inner.neighbors(member) {
                let successor_component = component_of[successor.index()];
                if successor_component != component_idx {
                    let entry = &mut component_depth[successor_component];
                    *entry = (*entry).max(depth + 1);
                }
            }
        }
    }

    let depths: Vec<usize> = (0..node_count)
        .map(|idx| component_depth[component_of[idx]])
        .collect();

    let column_count = depths.iter().max().map_or(0, |max| max + 1);
    let mut columns = vec![Vec::new(); column_count];
    for (idx, &depth) in depths.iter().enumerate() {
        columns[depth].push(idx);
    }

    debug!(
        nodes = node_count,
        roots = graph.roots().count(),
        components = components.len(),
        columns = column_count;
        "Depths assigned"
    );

    Depths { depths, columns }
}
