//! Wire shape of a snapshot document.

use serde::Deserialize;

use tributary_core::{
    identifier::Id,
    lineage::{LineageEdge, LineageNode, LineageVersion, Metadata, NodeRole, Snapshot},
};

#[derive(Debug, Deserialize)]
pub(crate) struct WireSnapshot {
    pub(crate) nodes: Vec<WireNode>,
    #[serde(default, alias = "edges")]
    pub(crate) links: Vec<WireLink>,
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) versions: Vec<LineageVersion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireNode {
    id: String,
    #[serde(rename = "type")]
    role: NodeRole,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireLink {
    source: String,
    target: String,
    #[serde(default)]
    transformation_logic: Option<String>,
}

impl WireSnapshot {
    pub(crate) fn into_snapshot(self) -> Snapshot {
        let nodes = self.nodes.into_iter().map(WireNode::into_node).collect();
        let edges = self.links.into_iter().map(WireLink::into_edge).collect();

        Snapshot::new(nodes, edges, self.version, self.versions)
    }
}

impl WireNode {
    fn into_node(self) -> LineageNode {
        let id = Id::new(&self.id);
        let label = self.label.unwrap_or(self.id);
        LineageNode::new(id, self.role, label).with_metadata(self.metadata)
    }
}

impl WireLink {
    fn into_edge(self) -> LineageEdge {
        let edge = LineageEdge::new(Id::new(&self.source), Id::new(&self.target));
        match self.transformation_logic {
            Some(logic) => edge.with_transformation_logic(logic),
            None => edge,
        }
    }
}
