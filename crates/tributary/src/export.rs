//! Export of computed layouts.
//!
//! This module provides the [`Exporter`] trait that turns a
//! [`LayoutResult`] into an output document. It is the final stage of the
//! Tributary pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Snapshot JSON
//!     ↓ parse
//! Snapshot
//!     ↓ normalize, level, place
//! LayoutResult
//!     ↓ export (this module)
//! SVG / JSON text
//! ```
//!
//! # Available Backends
//!
//! - [`svg`]: SVG output via [`svg::SvgBuilder`] and [`svg::Svg`]
//! - [`json`]: the serialized layout via [`json::Json`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. [`Error`] converts into
//! [`TributaryError::Export`] at the crate boundary.
//!
//! [`TributaryError::Export`]: crate::TributaryError::Export

pub mod json;
pub mod svg;

use crate::layout::LayoutResult;

/// Abstraction for layout export backends.
pub trait Exporter {
    /// Renders `layout` into the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the layout cannot be converted to the target
    /// format.
    fn export_layout(&self, layout: &LayoutResult) -> Result<String, Error>;
}

/// Errors that can occur during export.
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// Serialization of the layout failed.
    Serialize(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Serialize(err) => write!(f, "Serialization error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Serialize(err) => Some(err),
        }
    }
}
