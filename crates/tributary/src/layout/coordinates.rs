//! Column coordinates.
//!
//! Columns run left to right by depth. Inside a column nodes are stacked top
//! to bottom in input order, centered on `center_y`.

use tributary_core::geometry::Point;

use super::depth::Depths;
use crate::config::LayoutConfig;

/// Returns the center of every node, indexed by input position.
pub(crate) fn assign_positions(depths: &Depths, config: &LayoutConfig) -> Vec<Point> {
    let node_count = depths.columns().iter().map(Vec::len).sum();
    let mut positions = vec![Point::default(); node_count];

    for (depth, column) in depths.columns().iter().enumerate() {
        let x = config.base_x() + depth as f32 * config.column_spacing();
        let middle = (column.len() as f32 - 1.0) / 2.0;

        for (row, &idx) in column.iter().enumerate() {
            let y = config.center_y() + (row as f32 - middle) * config.row_spacing();
            positions[idx] = Point::new(x, y);
        }
    }

    positions
}
