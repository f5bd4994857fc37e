//! Graph structure preparation.
//!
//! Turns the raw node and edge lists of a snapshot into a canonical graph:
//!
//! - [`normalize`] drops blank ids, deduplicates and drops dangling edges,
//!   reporting [`LayoutWarning`]s
//! - [`check_versions`] reports repeated entries of a version history
//! - `LineageGraph` is the `petgraph` view the layout traverses

mod lineage_graph;
mod normalize;

pub(crate) use lineage_graph::LineageGraph;
pub use normalize::{LayoutWarning, MissingEndpoint, NormalizedGraph, check_versions, normalize};
