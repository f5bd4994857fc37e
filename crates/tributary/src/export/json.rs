//! JSON export backend.

use log::debug;

use super::{Error, Exporter};
use crate::layout::LayoutResult;

/// Pretty-printed JSON rendering of a [`LayoutResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Exporter for Json {
    fn export_layout(&self, layout: &LayoutResult) -> Result<String, Error> {
        let json = serde_json::to_string_pretty(layout).map_err(Error::Serialize)?;
        debug!(bytes = json.len(); "JSON document rendered");
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use tributary_core::{
        identifier::Id,
        lineage::{LineageEdge, LineageNode, NodeRole, Snapshot},
    };

    use super::*;
    use crate::layout::LayoutEngine;

    #[test]
    fn test_export_round_trips_through_serde_json() {
        let snapshot = Snapshot::new(
            vec![
                LineageNode::new(Id::new("raw"), NodeRole::Source, "Raw events"),
                LineageNode::new(Id::new("clean"), NodeRole::Target, "Clean events"),
            ],
            vec![LineageEdge::new(Id::new("raw"), Id::new("clean"))],
            4,
            Vec::new(),
        );
        let layout = LayoutEngine::default().compute(&snapshot);

        let json = Json.export_layout(&layout).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], 4);
        assert_eq!(value["nodes"][1]["label"], "Clean events");
        assert_eq!(value["edges"][0]["renderId"], "raw->clean");
        assert!(value["edges"][0].get("transformationLogic").is_none());
    }
}
