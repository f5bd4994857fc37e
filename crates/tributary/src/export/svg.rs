//! SVG export backend.
//!
//! Nodes are drawn as rounded rectangles filled with their role's tier
//! color. Edges are cubic curves from the right side of the source to the
//! left side of the target, ending in an arrow marker. An edge with a
//! transformation description carries it in a `<title>` child, which
//! browsers show on hover, and every edge path carries its render id in a
//! `data-render-id` attribute.

use log::{debug, info};
use svg::{
    Document, Node,
    node::{
        self,
        element::{self as svg_element, Definitions, Element, Group, Marker, Path, Rectangle},
    },
};

use tributary_core::{
    color::Color,
    geometry::{Bounds, Insets, Point, Size},
    lineage::NodeRole,
};

use super::{Error, Exporter};
use crate::{
    config::StyleConfig,
    layout::{Detail, LayoutResult, PositionedEdge, PositionedNode},
};

const MARKER_ID: &str = "lineage-arrow";
const MARGIN: f32 = 40.0;
const FONT_SIZE: f32 = 13.0;
const LABEL_PADDING: f32 = 10.0;
const EMPTY_STATE_TEXT: &str = "select a data product";

/// Resolves a [`StyleConfig`] into an [`Svg`] exporter.
#[derive(Debug, Default)]
pub struct SvgBuilder<'a> {
    style: Option<&'a StyleConfig>,
}

impl<'a> SvgBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: &'a StyleConfig) -> Self {
        self.style = Some(style);
        self
    }

    /// Parses the configured colors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if a configured color is invalid.
    pub fn build(self) -> Result<Svg, Error> {
        let default_style = StyleConfig::default();
        let style = self.style.unwrap_or(&default_style);
        let render_err = |err: crate::config::ConfigError| Error::Render(err.to_string());

        let role_colors = [
            style.role_color(NodeRole::Source).map_err(render_err)?,
            style.role_color(NodeRole::Transformation).map_err(render_err)?,
            style.role_color(NodeRole::Target).map_err(render_err)?,
        ];

        Ok(Svg {
            role_colors,
            edge_color: style.edge_color().map_err(render_err)?,
            background_color: style.background_color().map_err(render_err)?,
        })
    }
}

/// SVG exporter with resolved colors.
#[derive(Debug, Clone)]
pub struct Svg {
    role_colors: [Color; 3],
    edge_color: Color,
    background_color: Option<Color>,
}

impl Svg {
    /// Renders `layout` into an SVG document.
    pub fn render(&self, layout: &LayoutResult) -> Document {
        let Some(content_bounds) = layout.bounds() else {
            debug!("Rendering empty state");
            return self.render_empty_state();
        };

        let bounds = content_bounds.add_padding(Insets::uniform(MARGIN));
        let doc = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    bounds.min_x(),
                    bounds.min_y(),
                    bounds.width(),
                    bounds.height()
                ),
            )
            .set("width", bounds.width())
            .set("height", bounds.height());
        let doc = self.add_background(doc, bounds);

        let mut edges = Group::new().set("class", "lineage-edges");
        for edge in layout.edges() {
            let (Some(source), Some(target)) = (
                layout.node(edge.edge().source()),
                layout.node(edge.edge().target()),
            ) else {
                continue;
            };
            edges = edges.add(self.render_edge(layout, edge, source, target));
        }

        let mut nodes = Group::new().set("class", "lineage-nodes");
        for node in layout.nodes() {
            nodes = nodes.add(self.render_node(node, layout.node_size()));
        }

        doc.add(self.marker_definitions()).add(edges).add(nodes)
    }

    fn render_empty_state(&self) -> Document {
        let size = Size::new(400.0, 200.0);
        let bounds = Bounds::new_from_center(
            Point::new(size.width() / 2.0, size.height() / 2.0),
            size,
        );
        let doc = Document::new()
            .set("viewBox", format!("0 0 {} {}", size.width(), size.height()))
            .set("width", size.width())
            .set("height", size.height());
        let doc = self.add_background(doc, bounds);

        let text = svg_element::Text::new(EMPTY_STATE_TEXT)
            .set("x", size.width() / 2.0)
            .set("y", size.height() / 2.0)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-family", "sans-serif")
            .set("font-size", FONT_SIZE + 3.0)
            .set("fill", &self.edge_color)
            .set("class", "lineage-empty");
        doc.add(text)
    }

    fn add_background(&self, doc: Document, bounds: Bounds) -> Document {
        let Some(color) = &self.background_color else {
            return doc;
        };
        doc.add(
            Rectangle::new()
                .set("x", bounds.min_x())
                .set("y", bounds.min_y())
                .set("width", bounds.width())
                .set("height", bounds.height())
                .set("fill", color)
                .set("fill-opacity", color.alpha()),
        )
    }

    fn marker_definitions(&self) -> Definitions {
        let arrow = Marker::new()
            .set("id", MARKER_ID)
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                Path::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", &self.edge_color),
            );
        Definitions::new().add(arrow)
    }

    fn render_node(&self, node: &PositionedNode, size: Size) -> Group {
        let bounds = node.position().to_bounds(size);
        let fill = &self.role_colors[node.node().role().tier()];

        let rect = Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", size.width())
            .set("height", size.height())
            .set("rx", 8)
            .set("fill", fill)
            .set("stroke", &self.edge_color)
            .set("stroke-width", 1);

        let label = truncate_label(node.node().label(), size.width());
        let text = svg_element::Text::new(label)
            .set("x", node.position().x())
            .set("y", node.position().y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-family", "sans-serif")
            .set("font-size", FONT_SIZE);

        Group::new()
            .set("class", format!("lineage-node lineage-{}", node.node().role()))
            .set("data-node-id", node.id().to_string())
            .add(title(node.node().label()))
            .add(rect)
            .add(text)
    }

    fn render_edge(
        &self,
        layout: &LayoutResult,
        edge: &PositionedEdge,
        source: &PositionedNode,
        target: &PositionedNode,
    ) -> Path {
        let size = layout.node_size();
        let path_data = if edge.edge().is_self_loop() {
            self_loop_path_data(source.position(), size)
        } else {
            edge_path_data(source.position(), target.position(), size)
        };

        let mut path = Path::new()
            .set("d", path_data)
            .set("fill", "none")
            .set("stroke", &self.edge_color)
            .set("stroke-width", 1.5)
            .set("marker-end", format!("url(#{MARKER_ID})"))
            .set("class", "lineage-edge")
            .set("data-render-id", edge.render_id().as_str());

        if let Detail::Logic(logic) = layout.detail(edge.render_id().as_str()) {
            path = path.add(title(logic));
        }
        path
    }
}

impl Exporter for Svg {
    fn export_layout(&self, layout: &LayoutResult) -> Result<String, Error> {
        let doc = self.render(layout);
        let rendered = doc.to_string();
        info!(
            nodes = layout.nodes().len(),
            edges = layout.edges().len(),
            bytes = rendered.len();
            "SVG document rendered"
        );
        Ok(rendered)
    }
}

fn title(content: &str) -> Element {
    let mut title = Element::new("title");
    title.append(node::Text::new(content));
    title
}

/// Path from the right side of `source` to the left side of `target`.
///
/// Edges between nodes of the same column (cycle members) bulge out to the
/// right of the column instead of crossing it.
fn edge_path_data(source: Point, target: Point, size: Size) -> String {
    let half_width = size.width() / 2.0;
    let start = Point::new(source.x() + half_width, source.y());

    if target.x() > source.x() {
        let end = Point::new(target.x() - half_width, target.y());
        let mid_x = start.midpoint(end).x();
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            start.x(),
            start.y(),
            mid_x,
            start.y(),
            mid_x,
            end.y(),
            end.x(),
            end.y()
        )
    } else {
        let end = Point::new(target.x() + half_width, target.y());
        let bulge = start.x().max(end.x()) + size.width() / 3.0;
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            start.x(),
            start.y(),
            bulge,
            start.y(),
            bulge,
            end.y(),
            end.x(),
            end.y()
        )
    }
}

/// Arc over the top of a node from its right quarter back to its left quarter.
fn self_loop_path_data(center: Point, size: Size) -> String {
    let top = center.y() - size.height() / 2.0;
    let quarter = size.width() / 4.0;
    let rise = size.height() * 0.75;
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        center.x() + quarter,
        top,
        center.x() + quarter,
        top - rise,
        center.x() - quarter,
        top - rise,
        center.x() - quarter,
        top
    )
}

/// Shortens `label` with an ellipsis so it fits a node of `width`.
fn truncate_label(label: &str, width: f32) -> String {
    let max_chars = ((width - 2.0 * LABEL_PADDING) / (FONT_SIZE * 0.6)).floor().max(1.0) as usize;
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use tributary_core::{
        identifier::Id,
        lineage::{LineageEdge, LineageNode, Snapshot},
    };

    use super::*;
    use crate::layout::LayoutEngine;

    fn render(snapshot: &Snapshot) -> String {
        let layout = LayoutEngine::default().compute(snapshot);
        SvgBuilder::new().build().unwrap().export_layout(&layout).unwrap()
    }

    #[test]
    fn test_empty_layout_renders_empty_state() {
        let svg = render(&Snapshot::new(Vec::new(), Vec::new(), 1, Vec::new()));

        assert!(svg.contains("select a data product"));
        assert!(!svg.contains("lineage-node"));
    }

    #[test]
    fn test_nodes_and_edges_rendered() {
        let snapshot = Snapshot::new(
            vec![
                LineageNode::new(Id::new("orders"), NodeRole::Source, "Orders"),
                LineageNode::new(Id::new("revenue"), NodeRole::Target, "Revenue"),
            ],
            vec![
                LineageEdge::new(Id::new("orders"), Id::new("revenue"))
                    .with_transformation_logic("SUM(amount) GROUP BY day"),
            ],
            1,
            Vec::new(),
        );

        let svg = render(&snapshot);

        assert_eq!(svg.matches("<rect").count(), 2);
        // Attribute values are XML-escaped.
        assert!(svg.contains("data-render-id=\"orders-&gt;revenue\""));
        assert!(!svg.contains("orders->revenue"));
        assert!(svg.contains("SUM(amount) GROUP BY day"));
        assert!(svg.contains("url(#lineage-arrow)"));
        assert!(svg.contains("Orders"));
    }

    #[test]
    fn test_self_loop_rendered() {
        let snapshot = Snapshot::new(
            vec![LineageNode::new(Id::new("loop"), NodeRole::Transformation, "Loop")],
            vec![LineageEdge::new(Id::new("loop"), Id::new("loop"))],
            1,
            Vec::new(),
        );

        let svg = render(&snapshot);

        assert_eq!(svg.matches("class=\"lineage-edge\"").count(), 1);
    }

    #[test]
    fn test_background_color() {
        let style: StyleConfig = style_with_background("#ffffff");
        let layout = LayoutEngine::default().compute(&Snapshot::new(
            vec![LineageNode::new(Id::new("a"), NodeRole::Source, "a")],
            Vec::new(),
            1,
            Vec::new(),
        ));

        let svg = SvgBuilder::new()
            .with_style(&style)
            .build()
            .unwrap()
            .export_layout(&layout)
            .unwrap();

        assert_eq!(svg.matches("<rect").count(), 2);
    }

    #[test]
    fn test_invalid_color_fails_build() {
        let style: StyleConfig =
            serde_json::from_str(r#"{ "edge_color": "no-such-color" }"#).unwrap();

        assert!(matches!(
            SvgBuilder::new().with_style(&style).build(),
            Err(Error::Render(_))
        ));
    }

    fn style_with_background(background: &str) -> StyleConfig {
        serde_json::from_value(serde_json::json!({ "background_color": background })).unwrap()
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 180.0), "short");

        let long = "a_really_long_table_name_that_will_not_fit";
        let truncated = truncate_label(long, 180.0);
        assert!(truncated.ends_with('…'));
        assert_eq!(truncated.chars().count(), 20);
    }

    #[test]
    fn test_same_column_edge_bulges_right() {
        let data = edge_path_data(
            Point::new(100.0, 0.0),
            Point::new(100.0, 120.0),
            Size::new(180.0, 64.0),
        );

        assert!(data.starts_with("M 190 0 C 250 0, 250 120, 190 120"));
    }
}
