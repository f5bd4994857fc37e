//! Tributary - Deterministic layout for versioned data lineage graphs
//!
//! This library turns lineage snapshots (nodes, directed edges and a version
//! history, as exported by a metadata store) into a left-to-right layered
//! layout, and renders that layout to SVG or JSON. It also models the
//! product and version selection of an interactive lineage view.

pub mod config;
pub mod export;
pub mod layout;
pub mod source;
pub mod structure;
pub mod version;
pub mod view;

mod error;

pub use tributary_core::{color, geometry, identifier, lineage};

pub use error::TributaryError;

use log::{debug, info, trace};

use tributary_core::lineage::Snapshot;

use config::AppConfig;
use export::Exporter;
use layout::{LayoutEngine, LayoutResult};
use view::LineageView;

/// Builder for parsing, laying out and rendering lineage snapshots.
///
/// # Examples
///
/// ```
/// use tributary::{LineageBuilder, config::AppConfig};
///
/// let source = r#"{
///     "nodes": [
///         { "id": "orders", "type": "source", "label": "Orders" },
///         { "id": "revenue", "type": "target", "label": "Revenue" }
///     ],
///     "links": [{ "source": "orders", "target": "revenue" }],
///     "version": 1
/// }"#;
///
/// let builder = LineageBuilder::new(AppConfig::default());
///
/// let snapshot = builder.parse(source).expect("Failed to parse");
/// let layout = builder.layout(&snapshot).expect("Failed to lay out");
/// let svg = builder.render_svg(&layout).expect("Failed to render");
/// assert!(svg.contains("Orders"));
///
/// // Or use default config
/// let builder = LineageBuilder::default();
/// ```
#[derive(Default)]
pub struct LineageBuilder {
    config: AppConfig,
}

impl LineageBuilder {
    /// Create a new lineage builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including layout and style settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this builder was created with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Decode snapshot JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TributaryError::Snapshot`] with the offending source text if
    /// the JSON is malformed or has the wrong shape.
    pub fn parse(&self, source: &str) -> Result<Snapshot, TributaryError> {
        info!("Parsing lineage snapshot");
        let snapshot = tributary_snapshot::parse(source)
            .map_err(|err| TributaryError::new_snapshot_error(err, source))?;
        debug!(
            nodes = snapshot.nodes().len(),
            edges = snapshot.edges().len();
            "Snapshot parsed successfully"
        );
        trace!(snapshot:? = snapshot; "Parsed snapshot");
        Ok(snapshot)
    }

    /// Lay out a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`TributaryError::Config`] if the layout configuration is
    /// invalid. Data problems in the snapshot are never errors; they are
    /// reported in [`LayoutResult::warnings`].
    pub fn layout(&self, snapshot: &Snapshot) -> Result<LayoutResult, TributaryError> {
        self.config.layout().validate()?;
        let layout = LayoutEngine::new(*self.config.layout()).compute(snapshot);
        info!(
            nodes = layout.nodes().len(),
            edges = layout.edges().len(),
            warnings = layout.warnings().len();
            "Layout calculated"
        );
        Ok(layout)
    }

    /// Render a layout to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`TributaryError::Export`] if a configured color is invalid.
    pub fn render_svg(&self, layout: &LayoutResult) -> Result<String, TributaryError> {
        let exporter = export::svg::SvgBuilder::new()
            .with_style(self.config.style())
            .build()?;
        let svg = exporter.export_layout(layout)?;
        info!("SVG rendered successfully");
        Ok(svg)
    }

    /// Render a layout to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TributaryError::Export`] if serialization fails.
    pub fn render_json(&self, layout: &LayoutResult) -> Result<String, TributaryError> {
        let json = export::json::Json.export_layout(layout)?;
        info!("JSON rendered successfully");
        Ok(json)
    }

    /// Create an empty [`LineageView`] using this builder's layout settings.
    ///
    /// # Errors
    ///
    /// Returns [`TributaryError::Config`] if the layout configuration is
    /// invalid.
    pub fn view(&self) -> Result<LineageView, TributaryError> {
        self.config.layout().validate()?;
        Ok(LineageView::new(*self.config.layout()))
    }
}
