//! Lineage data model.
//!
//! A [`Snapshot`] is one immutable version of a data product's lineage graph:
//! [`LineageNode`]s connected by directed [`LineageEdge`]s, plus the product's
//! version history as [`LineageVersion`] entries. Snapshots are produced by an
//! external metadata store and only ever read by the layout engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifier::Id;

/// Role of a node in the flow of data.
///
/// The set is closed. The data-mesh taxonomy maps onto it one to one:
/// source-aligned products are sources, aggregates are transformations and
/// consumer-aligned products are targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    #[serde(alias = "source_aligned", alias = "sourceAligned")]
    Source,
    #[serde(alias = "aggregate")]
    Transformation,
    #[serde(alias = "consumer_aligned", alias = "consumerAligned")]
    Target,
}

impl NodeRole {
    /// All roles in tier order.
    pub const ALL: [NodeRole; 3] = [NodeRole::Source, NodeRole::Transformation, NodeRole::Target];

    /// Visual tier of the role, from upstream (0) to downstream (2).
    pub fn tier(self) -> usize {
        match self {
            NodeRole::Source => 0,
            NodeRole::Transformation => 1,
            NodeRole::Target => 2,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Source => write!(f, "source"),
            NodeRole::Transformation => write!(f, "transformation"),
            NodeRole::Target => write!(f, "target"),
        }
    }
}

/// Unstructured JSON attached to a node.
///
/// Carried through layout untouched; nothing in Tributary looks inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(serde_json::Value);

impl Metadata {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Returns the raw JSON value.
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Returns true for `null` and for an empty object.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

/// A node of a lineage graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineageNode {
    id: Id,
    role: NodeRole,
    label: String,
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

impl LineageNode {
    /// Creates a node with empty metadata.
    pub fn new(id: Id, role: NodeRole, label: impl Into<String>) -> Self {
        Self {
            id,
            role,
            label: label.into(),
            metadata: Metadata::default(),
        }
    }

    /// Attaches opaque metadata (builder style).
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// A directed edge from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEdge {
    source: Id,
    target: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    transformation_logic: Option<String>,
}

impl LineageEdge {
    pub fn new(source: Id, target: Id) -> Self {
        Self {
            source,
            target,
            transformation_logic: None,
        }
    }

    /// Sets the transformation description (builder style).
    ///
    /// Blank text is stored as absent, so an edge never carries an empty
    /// description.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tributary_core::{identifier::Id, lineage::LineageEdge};
    /// let edge = LineageEdge::new(Id::new("a"), Id::new("b")).with_transformation_logic("   ");
    /// assert_eq!(edge.transformation_logic(), None);
    /// ```
    pub fn with_transformation_logic(mut self, logic: impl Into<String>) -> Self {
        let logic = logic.into();
        self.transformation_logic = if logic.trim().is_empty() {
            None
        } else {
            Some(logic)
        };
        self
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn transformation_logic(&self) -> Option<&str> {
        self.transformation_logic.as_deref()
    }

    /// Returns true if the edge starts and ends at the same node.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// One entry of a data product's version history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageVersion {
    version: u32,
    timestamp: DateTime<Utc>,
}

impl LineageVersion {
    pub fn new(version: u32, timestamp: DateTime<Utc>) -> Self {
        Self { version, timestamp }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One immutable version of a lineage graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    nodes: Vec<LineageNode>,
    edges: Vec<LineageEdge>,
    version: u32,
    versions: Vec<LineageVersion>,
}

impl Snapshot {
    pub fn new(
        nodes: Vec<LineageNode>,
        edges: Vec<LineageEdge>,
        version: u32,
        versions: Vec<LineageVersion>,
    ) -> Self {
        Self {
            nodes,
            edges,
            version,
            versions,
        }
    }

    pub fn nodes(&self) -> &[LineageNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LineageEdge] {
        &self.edges
    }

    /// The version this snapshot reports for itself.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The product's version history, in the order the store reported it.
    pub fn versions(&self) -> &[LineageVersion] {
        &self.versions
    }

    /// Returns the highest known version, falling back to the snapshot's own
    /// version when the history is empty.
    pub fn current_version(&self) -> u32 {
        self.versions
            .iter()
            .map(LineageVersion::version)
            .max()
            .map_or(self.version, |latest| latest.max(self.version))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
