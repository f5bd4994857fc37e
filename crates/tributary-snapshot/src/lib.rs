//! Decoder for Tributary lineage snapshots.
//!
//! Metadata stores hand lineage over as JSON:
//!
//! ```text
//! {
//!   "nodes": [{ "id": "...", "type": "source", "label": "...", "metadata": { ... } }],
//!   "links": [{ "source": "...", "target": "...", "transformationLogic": "..." }],
//!   "version": 3,
//!   "versions": [{ "version": 3, "timestamp": "2024-03-01T12:00:00Z" }]
//! }
//! ```
//!
//! [`parse`] turns that text into a [`Snapshot`]. Decoding only rejects
//! text that is not a snapshot. It does not deduplicate, check edge
//! endpoints, reject blank node ids or check the version history; those are
//! data problems the layout engine reports as warnings rather than failures.
//!
//! # Example
//!
//! ```
//! let source = r#"{
//!     "nodes": [
//!         { "id": "orders", "type": "source", "label": "Orders" },
//!         { "id": "revenue", "type": "target", "label": "Revenue" }
//!     ],
//!     "links": [{ "source": "orders", "target": "revenue" }],
//!     "version": 1
//! }"#;
//!
//! let snapshot = tributary_snapshot::parse(source).unwrap();
//! assert_eq!(snapshot.nodes().len(), 2);
//! assert_eq!(snapshot.edges().len(), 1);
//! ```

pub mod error;

mod wire;

pub use error::{ErrorCode, Location, SnapshotError};

use log::{debug, trace};

use tributary_core::lineage::Snapshot;

/// Decodes a JSON snapshot.
///
/// # Errors
///
/// Returns [`SnapshotError`] for malformed JSON and for documents without the
/// snapshot shape.
pub fn parse(source: &str) -> Result<Snapshot, SnapshotError> {
    let wire: wire::WireSnapshot =
        serde_json::from_str(source).map_err(|err| SnapshotError::from_json(&err, source))?;

    debug!(
        nodes = wire.nodes.len(),
        links = wire.links.len(),
        versions = wire.versions.len();
        "Snapshot decoded"
    );

    let snapshot = wire.into_snapshot();
    trace!(snapshot:? = snapshot; "Decoded snapshot");

    Ok(snapshot)
}
