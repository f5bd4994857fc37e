//! Error types for Tributary operations.
//!
//! This module provides the main error type [`TributaryError`] which wraps
//! the error conditions of decoding, configuration, fetching and export.

use std::io;

use thiserror::Error;

use tributary_snapshot::SnapshotError;

use crate::{config::ConfigError, source::FetchError, version::SelectorError};

/// The main error type for Tributary operations.
///
/// # Diagnostic Variants
///
/// The `Snapshot` variant carries the decoded source text next to a
/// positioned [`SnapshotError`], so front ends can point at the offending
/// line.
#[derive(Debug, Error)]
pub enum TributaryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Snapshot { err: SnapshotError, src: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectorError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for TributaryError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl TributaryError {
    /// Create a new `Snapshot` error with the associated source text.
    pub fn new_snapshot_error(err: SnapshotError, src: impl Into<String>) -> Self {
        Self::Snapshot {
            err,
            src: src.into(),
        }
    }
}
