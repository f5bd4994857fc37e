//! Configuration types for lineage layout and rendering.
//!
//! All types implement [`serde::Deserialize`] so front ends can load them
//! from external sources; every field is optional and falls back to the
//! defaults documented on it.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and style settings.
//! - [`LayoutConfig`] - Column/row spacing, node size and edge identity.
//! - [`StyleConfig`] - Background and per-role colors for SVG output.
//!
//! # Example
//!
//! ```
//! # use tributary::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.layout().validate().is_ok());
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;
use thiserror::Error;

use tributary_core::{color::Color, geometry::Size, lineage::NodeRole};

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{name}` must be a positive, finite number, got {value}")]
    InvalidValue { name: &'static str, value: f32 },

    #[error("`{name}` must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },

    #[error("`{spacing}` ({spacing_value}) is smaller than `{extent}` ({extent_value}); nodes would overlap")]
    Overlap {
        spacing: &'static str,
        spacing_value: f32,
        extent: &'static str,
        extent_value: f32,
    },

    #[error("Invalid {name} in config: {reason}")]
    InvalidColor { name: &'static str, reason: String },
}

/// Top-level configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// How raw edges are keyed when they are deduplicated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeIdentity {
    /// One edge per `(source, target)` pair.
    #[default]
    Endpoints,

    /// One edge per `(source, target, transformation_logic)`; parallel edges
    /// with different logic are kept and get distinct render ids.
    EndpointsAndLogic,
}

/// Spacing and sizing of the left-to-right column layout.
///
/// A node at depth `d`, `i`-th of `n` nodes in its column, is centered at
///
/// ```text
/// x = base_x + d * column_spacing
/// y = center_y + (i - (n - 1) / 2) * row_spacing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// X of the depth-0 column. Defaults to 120.
    base_x: f32,

    /// Y of the axis every column is centered on. Defaults to 320.
    center_y: f32,

    /// Horizontal distance between adjacent columns. Defaults to 250.
    column_spacing: f32,

    /// Vertical distance between adjacent nodes of one column. Defaults to 120.
    row_spacing: f32,

    /// Rendered node width. Defaults to 180.
    node_width: f32,

    /// Rendered node height. Defaults to 64.
    node_height: f32,

    /// Edge deduplication key. Defaults to [`EdgeIdentity::Endpoints`].
    edge_identity: EdgeIdentity,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_x: 120.0,
            center_y: 320.0,
            column_spacing: 250.0,
            row_spacing: 120.0,
            node_width: 180.0,
            node_height: 64.0,
            edge_identity: EdgeIdentity::Endpoints,
        }
    }
}

impl LayoutConfig {
    pub fn with_origin(mut self, base_x: f32, center_y: f32) -> Self {
        self.base_x = base_x;
        self.center_y = center_y;
        self
    }

    pub fn with_spacing(mut self, column_spacing: f32, row_spacing: f32) -> Self {
        self.column_spacing = column_spacing;
        self.row_spacing = row_spacing;
        self
    }

    pub fn with_node_size(mut self, size: Size) -> Self {
        self.node_width = size.width();
        self.node_height = size.height();
        self
    }

    pub fn with_edge_identity(mut self, edge_identity: EdgeIdentity) -> Self {
        self.edge_identity = edge_identity;
        self
    }

    pub fn base_x(&self) -> f32 {
        self.base_x
    }

    pub fn center_y(&self) -> f32 {
        self.center_y
    }

    pub fn column_spacing(&self) -> f32 {
        self.column_spacing
    }

    pub fn row_spacing(&self) -> f32 {
        self.row_spacing
    }

    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }

    pub fn edge_identity(&self) -> EdgeIdentity {
        self.edge_identity
    }

    /// Checks that the values describe a layout without overlapping nodes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an origin coordinate is not finite, a
    /// spacing or size is not a positive finite number, or a spacing is
    /// smaller than the node extent along the same axis.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("base_x", self.base_x), ("center_y", self.center_y)] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }

        for (name, value) in [
            ("column_spacing", self.column_spacing),
            ("row_spacing", self.row_spacing),
            ("node_width", self.node_width),
            ("node_height", self.node_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue { name, value });
            }
        }

        if self.column_spacing < self.node_width {
            return Err(ConfigError::Overlap {
                spacing: "column_spacing",
                spacing_value: self.column_spacing,
                extent: "node_width",
                extent_value: self.node_width,
            });
        }

        if self.row_spacing < self.node_height {
            return Err(ConfigError::Overlap {
                spacing: "row_spacing",
                spacing_value: self.row_spacing,
                extent: "node_height",
                extent_value: self.node_height,
            });
        }

        Ok(())
    }
}

/// Visual styling configuration for rendered lineage graphs.
///
/// Colors are CSS color strings. Unset role colors fall back to a light
/// blue/amber/green tier palette.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background color; transparent when unset.
    #[serde(default)]
    background_color: Option<String>,

    #[serde(default)]
    source_color: Option<String>,

    #[serde(default)]
    transformation_color: Option<String>,

    #[serde(default)]
    target_color: Option<String>,

    /// Stroke color for edges and node borders.
    #[serde(default)]
    edge_color: Option<String>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, ConfigError> {
        self.background_color
            .as_deref()
            .map(|color| parse_color("background_color", color))
            .transpose()
    }

    /// Returns the fill color of a role tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn role_color(&self, role: NodeRole) -> Result<Color, ConfigError> {
        let (name, configured, fallback) = match role {
            NodeRole::Source => ("source_color", &self.source_color, "#dbeafe"),
            NodeRole::Transformation => {
                ("transformation_color", &self.transformation_color, "#fef3c7")
            }
            NodeRole::Target => ("target_color", &self.target_color, "#dcfce7"),
        };
        parse_color(name, configured.as_deref().unwrap_or(fallback))
    }

    /// Returns the stroke color for edges and node borders.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn edge_color(&self) -> Result<Color, ConfigError> {
        parse_color("edge_color", self.edge_color.as_deref().unwrap_or("#475569"))
    }
}

fn parse_color(name: &'static str, value: &str) -> Result<Color, ConfigError> {
    Color::new(value).map_err(|reason| ConfigError::InvalidColor { name, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let config = LayoutConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.column_spacing(), 250.0);
        assert_eq!(config.row_spacing(), 120.0);
        assert_eq!(config.edge_identity(), EdgeIdentity::Endpoints);
    }

    #[test]
    fn test_overlapping_columns_rejected() {
        let config = LayoutConfig::default().with_spacing(100.0, 120.0);

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Overlap {
                spacing: "column_spacing",
                ..
            }
        ));
    }

    #[test]
    fn test_overlapping_rows_rejected() {
        let config = LayoutConfig::default().with_spacing(250.0, 40.0);

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Overlap {
                spacing: "row_spacing",
                ..
            }
        ));
    }

    #[test]
    fn test_non_positive_values_rejected() {
        let config = LayoutConfig::default().with_node_size(Size::new(0.0, 64.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                name: "node_width",
                ..
            })
        ));

        let config = LayoutConfig::default().with_spacing(f32::NAN, 120.0);
        assert!(config.validate().is_err());

        let config = LayoutConfig::default().with_origin(f32::INFINITY, 0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { name: "base_x", .. })
        ));
    }

    #[test]
    fn test_role_colors_default() {
        let style = StyleConfig::default();

        for role in NodeRole::ALL {
            assert!(style.role_color(role).is_ok());
        }
        assert!(style.edge_color().is_ok());
        assert_eq!(style.background_color(), Ok(None));
    }

    #[test]
    fn test_invalid_role_color_reported() {
        let style = StyleConfig {
            target_color: Some("definitely-not-a-color".to_string()),
            ..StyleConfig::default()
        };

        let err = style.role_color(NodeRole::Target).unwrap_err();
        assert!(err.to_string().contains("target_color"));
    }
}
