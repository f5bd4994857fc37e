//! Tributary Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Tributary
//! lineage layout engine. It includes:
//!
//! - **Identifiers**: String-interned node identifiers ([`identifier::Id`])
//! - **Colors**: CSS color parsing for role tiers ([`color::Color`])
//! - **Geometry**: Points, sizes and bounds ([`geometry`] module)
//! - **Lineage**: Nodes, edges, versions and snapshots ([`lineage`] module)

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod lineage;
