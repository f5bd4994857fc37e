//! Layout of lineage snapshots.
//!
//! The [`LayoutEngine`] runs the pipeline for one snapshot:
//!
//! 1. normalize nodes and edges, collecting [`LayoutWarning`]s
//! 2. assign every node a depth (longest path from a root)
//! 3. place columns left to right and stack each column around `center_y`
//! 4. give every edge a [`RenderId`] and index its transformation text
//!
//! The result is recomputed from scratch for every snapshot and owned by the
//! caller for one render pass.

mod coordinates;
mod depth;
mod details;

pub use details::{Detail, RenderId, TransformationIndex};

use std::collections::HashMap;

use log::{debug, info, trace, warn};
use serde::Serialize;

use tributary_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
    lineage::{LineageEdge, LineageNode, LineageVersion, Snapshot},
};

use crate::{
    config::LayoutConfig,
    structure::{LayoutWarning, LineageGraph, check_versions, normalize},
};

/// A node with its column and center point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    #[serde(flatten)]
    node: LineageNode,
    depth: usize,
    position: Point,
}

impl PositionedNode {
    pub fn node(&self) -> &LineageNode {
        &self.node
    }

    pub fn id(&self) -> Id {
        self.node.id()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Center of the node.
    pub fn position(&self) -> Point {
        self.position
    }
}

/// An edge with the id it is rendered under.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedEdge {
    #[serde(flatten)]
    edge: LineageEdge,
    render_id: RenderId,
}

impl PositionedEdge {
    pub fn edge(&self) -> &LineageEdge {
        &self.edge
    }

    pub fn render_id(&self) -> &RenderId {
        &self.render_id
    }
}

/// Positioned graph of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    version: u32,
    current_version: u32,
    versions: Vec<LineageVersion>,
    node_size: Size,
    nodes: Vec<PositionedNode>,
    edges: Vec<PositionedEdge>,
    warnings: Vec<LayoutWarning>,
    #[serde(skip)]
    details: TransformationIndex,
}

impl LayoutResult {
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Highest version the product is known to have. Differs from
    /// [`version`](Self::version) when an older version was pinned.
    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    /// Returns true if the laid-out version is the product's latest.
    pub fn is_current(&self) -> bool {
        self.version == self.current_version
    }

    /// The version history exactly as the snapshot reported it.
    pub fn versions(&self) -> &[LineageVersion] {
        &self.versions
    }

    pub fn node_size(&self) -> Size {
        self.node_size
    }

    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[PositionedEdge] {
        &self.edges
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    pub fn details(&self) -> &TransformationIndex {
        &self.details
    }

    /// Returns true if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: Id) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Shorthand for `details().lookup(render_id)`.
    pub fn detail(&self, render_id: &str) -> Detail<'_> {
        self.details.lookup(render_id)
    }

    /// Bounding box of all node rectangles, or `None` for an empty layout.
    pub fn bounds(&self) -> Option<Bounds> {
        self.nodes
            .iter()
            .map(|node| node.position.to_bounds(self.node_size))
            .reduce(|acc, bounds| acc.merge(&bounds))
    }
}

/// Computes [`LayoutResult`]s with one fixed [`LayoutConfig`].
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Creates an engine. The configuration is expected to be validated.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out `snapshot`.
    ///
    /// Never fails: data problems are fixed up and reported as warnings,
    /// cycles are leveled structurally, and an empty snapshot yields an empty
    /// result that still carries the version history.
    pub fn compute(&self, snapshot: &Snapshot) -> LayoutResult {
        info!(
            nodes = snapshot.nodes().len(),
            edges = snapshot.edges().len(),
            version = snapshot.version();
            "Computing lineage layout"
        );

        let normalized = normalize(
            snapshot.nodes(),
            snapshot.edges(),
            self.config.edge_identity(),
        );
        let version_warnings = check_versions(snapshot.versions());
        for warning in normalized.warnings().iter().chain(&version_warnings) {
            warn!("{warning}");
        }

        let graph = LineageGraph::from_normalized(&normalized);
        let depths = depth::assign_depths(&graph);
        let positions = coordinates::assign_positions(&depths, &self.config);
        trace!(depths:? = depths; "Node depths");

        let (nodes, edges, mut warnings) = normalized.into_parts();
        warnings.extend(version_warnings);

        let nodes: Vec<PositionedNode> = nodes
            .into_iter()
            .zip(positions)
            .enumerate()
            .map(|(idx, (node, position))| PositionedNode {
                node,
                depth: depths.depth(idx).unwrap_or_default(),
                position,
            })
            .collect();

        let mut parallel: HashMap<(Id, Id), usize> = HashMap::new();
        let mut details = TransformationIndex::default();
        let edges: Vec<PositionedEdge> = edges
            .into_iter()
            .map(|edge| {
                let seen = parallel.entry((edge.source(), edge.target())).or_insert(0);
                let render_id = details.assign(&edge, *seen);
                *seen += 1;
                PositionedEdge { edge, render_id }
            })
            .collect();

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            columns = depths.columns().len(),
            warnings = warnings.len();
            "Lineage layout computed"
        );

        LayoutResult {
            version: snapshot.version(),
            current_version: snapshot.current_version(),
            versions: snapshot.versions().to_vec(),
            node_size: self.config.node_size(),
            nodes,
            edges,
            warnings,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use float_cmp::approx_eq;
    use tributary_core::lineage::NodeRole;

    use super::*;
    use crate::{config::EdgeIdentity, structure::MissingEndpoint};

    fn node(id: &str, role: NodeRole) -> LineageNode {
        LineageNode::new(Id::new(id), role, id)
    }

    fn edge(source: &str, target: &str) -> LineageEdge {
        LineageEdge::new(Id::new(source), Id::new(target))
    }

    fn snapshot(nodes: Vec<LineageNode>, edges: Vec<LineageEdge>) -> Snapshot {
        Snapshot::new(nodes, edges, 1, Vec::new())
    }

    fn abc() -> Vec<LineageNode> {
        vec![
            node("A", NodeRole::Source),
            node("B", NodeRole::Transformation),
            node("C", NodeRole::Target),
        ]
    }

    #[test]
    fn test_chain_with_duplicate_edge() {
        let snapshot = snapshot(abc(), vec![edge("A", "B"), edge("B", "C"), edge("A", "B")]);

        let result = LayoutEngine::default().compute(&snapshot);

        assert_eq!(result.edges().len(), 2);
        let depths: Vec<usize> = result.nodes().iter().map(PositionedNode::depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);

        let xs: Vec<f32> = result.nodes().iter().map(|n| n.position().x()).collect();
        assert!(xs[0] < xs[1] && xs[1] < xs[2]);
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_cycle_terminates_at_depth_zero() {
        let snapshot = snapshot(
            vec![node("A", NodeRole::Source), node("B", NodeRole::Target)],
            vec![edge("A", "B"), edge("B", "A")],
        );

        let result = LayoutEngine::default().compute(&snapshot);

        assert_eq!(result.node(Id::new("A")).unwrap().depth(), 0);
        assert_eq!(result.node(Id::new("B")).unwrap().depth(), 0);
        assert_eq!(result.edges().len(), 2);
    }

    #[test]
    fn test_dangling_edge_reported() {
        let snapshot = snapshot(abc(), vec![edge("A", "B"), edge("B", "ghost")]);

        let result = LayoutEngine::default().compute(&snapshot);

        assert_eq!(result.edges().len(), 1);
        assert_eq!(
            result.warnings(),
            &[LayoutWarning::DanglingEdge {
                source: Id::new("B"),
                target: Id::new("ghost"),
                missing: MissingEndpoint::Target,
            }]
        );
        assert_eq!(result.detail("B->ghost"), Detail::UnknownEdge);
    }

    #[test]
    fn test_empty_snapshot_keeps_versions() {
        let versions = vec![
            LineageVersion::new(1, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            LineageVersion::new(2, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
        ];
        let snapshot = Snapshot::new(Vec::new(), Vec::new(), 2, versions.clone());

        let result = LayoutEngine::default().compute(&snapshot);

        assert!(result.is_empty());
        assert!(result.edges().is_empty());
        assert_eq!(result.bounds(), None);
        assert_eq!(result.versions(), versions.as_slice());
        assert_eq!(result.version(), 2);
        assert_eq!(result.current_version(), 2);
        assert!(result.is_current());
    }

    #[test]
    fn test_repeated_version_warns_and_keeps_history() {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let versions = vec![
            LineageVersion::new(1, timestamp),
            LineageVersion::new(1, timestamp),
        ];
        let snapshot = Snapshot::new(abc(), vec![edge("A", "ghost")], 1, versions.clone());

        let result = LayoutEngine::default().compute(&snapshot);

        assert_eq!(result.versions(), versions.as_slice());
        assert_eq!(result.warnings().len(), 2);
        assert!(matches!(result.warnings()[0], LayoutWarning::DanglingEdge { .. }));
        assert_eq!(
            result.warnings()[1],
            LayoutWarning::RepeatedVersion { version: 1 }
        );
    }

    #[test]
    fn test_pinned_older_version_is_not_current() {
        let versions: Vec<LineageVersion> = [1, 2, 3]
            .into_iter()
            .map(|v| LineageVersion::new(v, Utc.with_ymd_and_hms(2024, v, 1, 0, 0, 0).unwrap()))
            .collect();
        let snapshot = Snapshot::new(abc(), Vec::new(), 1, versions);

        let result = LayoutEngine::default().compute(&snapshot);

        assert_eq!(result.version(), 1);
        assert_eq!(result.current_version(), 3);
        assert!(!result.is_current());
    }

    #[test]
    fn test_render_ids_and_details() {
        let snapshot = snapshot(
            abc(),
            vec![
                edge("A", "B").with_transformation_logic("filter active"),
                edge("B", "C"),
            ],
        );

        let result = LayoutEngine::default().compute(&snapshot);

        let ids: Vec<&str> = result.edges().iter().map(|e| e.render_id().as_str()).collect();
        assert_eq!(ids, vec!["A->B", "B->C"]);
        assert_eq!(result.detail("A->B"), Detail::Logic("filter active"));
        assert_eq!(result.detail("B->C"), Detail::Absent);
    }

    #[test]
    fn test_parallel_edges_get_suffixed_render_ids() {
        let config = LayoutConfig::default().with_edge_identity(EdgeIdentity::EndpointsAndLogic);
        let snapshot = snapshot(
            abc(),
            vec![
                edge("A", "B").with_transformation_logic("join"),
                edge("A", "B").with_transformation_logic("dedupe"),
                edge("A", "B"),
            ],
        );

        let result = LayoutEngine::new(config).compute(&snapshot);

        let ids: Vec<&str> = result.edges().iter().map(|e| e.render_id().as_str()).collect();
        assert_eq!(ids, vec!["A->B", "A->B#1", "A->B#2"]);
        assert_eq!(result.detail("A->B#1"), Detail::Logic("dedupe"));
        assert_eq!(result.detail("A->B#2"), Detail::Absent);
    }

    #[test]
    fn test_render_ids_unique_when_node_ids_contain_separators() {
        let snapshot = snapshot(
            vec![
                node("a", NodeRole::Source),
                node("b->c", NodeRole::Transformation),
                node("a->b", NodeRole::Transformation),
                node("c", NodeRole::Target),
            ],
            vec![
                edge("a", "b->c").with_transformation_logic("first"),
                edge("a->b", "c").with_transformation_logic("second"),
            ],
        );

        let result = LayoutEngine::default().compute(&snapshot);

        let ids: Vec<&str> = result.edges().iter().map(|e| e.render_id().as_str()).collect();
        assert_eq!(ids, vec!["a->b->c", "a->b->c#1"]);
        assert_eq!(result.details().len(), 2);
        assert_eq!(result.detail(ids[0]), Detail::Logic("first"));
        assert_eq!(result.detail(ids[1]), Detail::Logic("second"));
    }

    #[test]
    fn test_parallel_render_id_skips_hash_in_node_id() {
        let config = LayoutConfig::default().with_edge_identity(EdgeIdentity::EndpointsAndLogic);
        let snapshot = snapshot(
            vec![
                node("a", NodeRole::Source),
                node("b", NodeRole::Target),
                node("b#1", NodeRole::Target),
            ],
            vec![
                edge("a", "b").with_transformation_logic("join"),
                edge("a", "b#1").with_transformation_logic("hash"),
                edge("a", "b").with_transformation_logic("dedupe"),
            ],
        );

        let result = LayoutEngine::new(config).compute(&snapshot);

        let ids: Vec<&str> = result.edges().iter().map(|e| e.render_id().as_str()).collect();
        assert_eq!(ids, vec!["a->b", "a->b#1", "a->b#2"]);
        assert_eq!(result.detail("a->b#1"), Detail::Logic("hash"));
        assert_eq!(result.detail("a->b#2"), Detail::Logic("dedupe"));
    }

    #[test]
    fn test_bounds_cover_all_nodes() {
        let snapshot = snapshot(abc(), vec![edge("A", "B"), edge("A", "C")]);

        let result = LayoutEngine::default().compute(&snapshot);
        let bounds = result.bounds().unwrap();

        // A at x=120, B and C share the second column at x=370.
        assert!(approx_eq!(f32, bounds.min_x(), 30.0));
        assert!(approx_eq!(f32, bounds.max_x(), 460.0));
        assert!(approx_eq!(f32, bounds.min_y(), 228.0));
        assert!(approx_eq!(f32, bounds.max_y(), 412.0));
    }

    #[test]
    fn test_serialized_shape() {
        let snapshot = snapshot(
            vec![node("A", NodeRole::Source), node("B", NodeRole::Target)],
            vec![edge("A", "B").with_transformation_logic("copy")],
        );

        let result = LayoutEngine::default().compute(&snapshot);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["version"], 1);
        assert_eq!(json["currentVersion"], 1);
        assert_eq!(json["nodes"][0]["id"], "A");
        assert_eq!(json["nodes"][0]["role"], "source");
        assert_eq!(json["nodes"][1]["depth"], 1);
        assert_eq!(json["nodes"][1]["position"]["x"], 370.0);
        assert_eq!(json["edges"][0]["renderId"], "A->B");
        assert_eq!(json["edges"][0]["transformationLogic"], "copy");
        assert_eq!(json["nodeSize"]["width"], 180.0);
        assert!(json["warnings"].as_array().unwrap().is_empty());
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;
    use tributary_core::lineage::NodeRole;

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Random graph over nodes `n0..n{k}`, with a few repeated nodes and edge
    /// endpoints that may fall outside the node set.
    fn graph_strategy() -> impl Strategy<Value = Snapshot> {
        (1usize..12).prop_flat_map(|node_count| {
            let edges = prop::collection::vec((0..node_count + 2, 0..node_count + 2), 0..30);
            let duplicates = prop::collection::vec(0..node_count, 0..3);
            (Just(node_count), edges, duplicates).prop_map(|(node_count, edges, duplicates)| {
                let mut nodes: Vec<LineageNode> = (0..node_count)
                    .map(|i| LineageNode::new(Id::new(&format!("n{i}")), NodeRole::Source, "n"))
                    .collect();
                for i in duplicates {
                    nodes.push(LineageNode::new(
                        Id::new(&format!("n{i}")),
                        NodeRole::Target,
                        "dup",
                    ));
                }
                let edges = edges
                    .into_iter()
                    .map(|(s, t)| {
                        LineageEdge::new(Id::new(&format!("n{s}")), Id::new(&format!("n{t}")))
                    })
                    .collect();
                Snapshot::new(nodes, edges, 1, Vec::new())
            })
        })
    }

    /// Returns true if `target` reaches `source`, i.e. the edge closes a cycle.
    fn closes_cycle(result: &LayoutResult, source: Id, target: Id) -> bool {
        let mut stack = vec![target];
        let mut seen = vec![target];
        while let Some(current) = stack.pop() {
            if current == source {
                return true;
            }
            for edge in result.edges().iter().map(PositionedEdge::edge) {
                if edge.source() == current && !seen.contains(&edge.target()) {
                    seen.push(edge.target());
                    stack.push(edge.target());
                }
            }
        }
        false
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Laying out the same snapshot twice places every node identically.
    fn check_layout_is_deterministic(snapshot: &Snapshot) -> Result<(), TestCaseError> {
        let engine = LayoutEngine::default();

        let first = engine.compute(snapshot);
        let second = engine.compute(snapshot);

        prop_assert_eq!(first, second);
        Ok(())
    }

    /// Nodes sharing a column are at least one row apart.
    fn check_no_overlap_within_column(snapshot: &Snapshot) -> Result<(), TestCaseError> {
        let engine = LayoutEngine::default();
        let row_spacing = engine.config().row_spacing();

        let result = engine.compute(snapshot);

        for (i, a) in result.nodes().iter().enumerate() {
            for b in &result.nodes()[i + 1..] {
                if a.depth() == b.depth() {
                    let gap = (a.position().y() - b.position().y()).abs();
                    prop_assert!(gap >= row_spacing - 1e-3, "{} and {} are {gap} apart", a.id(), b.id());
                }
            }
        }
        Ok(())
    }

    /// Every edge points right unless it lies on a cycle.
    fn check_ancestor_left_of_descendant(snapshot: &Snapshot) -> Result<(), TestCaseError> {
        let result = LayoutEngine::default().compute(snapshot);

        for positioned in result.edges() {
            let edge = positioned.edge();
            let source = result.node(edge.source());
            let target = result.node(edge.target());
            prop_assert!(source.is_some() && target.is_some());

            if let (Some(source), Some(target)) = (source, target) {
                prop_assert!(source.depth() <= target.depth());
                if source.depth() == target.depth() {
                    prop_assert!(closes_cycle(&result, edge.source(), edge.target()));
                } else {
                    prop_assert!(source.position().x() < target.position().x());
                }
            }
        }
        Ok(())
    }

    /// Feeding a layout's own nodes and edges back in changes nothing.
    fn check_normalized_input_gives_same_layout(snapshot: &Snapshot) -> Result<(), TestCaseError> {
        let engine = LayoutEngine::default();
        let raw = engine.compute(snapshot);

        let nodes = raw.nodes().iter().map(|n| n.node().clone()).collect();
        let edges = raw.edges().iter().map(|e| e.edge().clone()).collect();
        let again = engine.compute(&Snapshot::new(nodes, edges, 1, Vec::new()));

        prop_assert_eq!(raw.nodes(), again.nodes());
        prop_assert_eq!(raw.edges(), again.edges());
        prop_assert!(again.warnings().is_empty());
        Ok(())
    }

    proptest! {
        #[test]
        fn layout_is_deterministic(snapshot in graph_strategy()) {
            check_layout_is_deterministic(&snapshot)?;
        }

        #[test]
        fn no_overlap_within_column(snapshot in graph_strategy()) {
            check_no_overlap_within_column(&snapshot)?;
        }

        #[test]
        fn ancestor_left_of_descendant(snapshot in graph_strategy()) {
            check_ancestor_left_of_descendant(&snapshot)?;
        }

        #[test]
        fn normalized_input_gives_same_layout(snapshot in graph_strategy()) {
            check_normalized_input_gives_same_layout(&snapshot)?;
        }
    }
}
