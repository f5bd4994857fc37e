//! Error adapter for converting TributaryError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! Snapshot decode errors, whether raised while parsing a file directly or
//! while reading a catalog, are rendered against their source text with the
//! failing position underlined.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use tributary::{TributaryError, source::FetchError};
use tributary_snapshot::SnapshotError;

/// Adapter for a snapshot decode error with its source text.
pub struct SnapshotAdapter<'a> {
    err: &'a SnapshotError,
    src: &'a str,
}

impl<'a> SnapshotAdapter<'a> {
    pub fn new(err: &'a SnapshotError, src: &'a str) -> Self {
        Self { err, src }
    }
}

impl fmt::Debug for SnapshotAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for SnapshotAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.err.message())
    }
}

impl std::error::Error for SnapshotAdapter<'_> {}

impl MietteDiagnostic for SnapshotAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.err.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.err
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let location = self.err.location()?;
        let span = SourceSpan::new(location.offset().into(), 0);
        let message = format!("line {}, column {}", location.line(), location.column());
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some(message), span),
        )))
    }
}

/// Adapter for [`TributaryError`] variants without source text.
pub struct ErrorAdapter<'a>(pub &'a TributaryError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            TributaryError::Io(_) => "tributary::io",
            TributaryError::Snapshot { .. } => return None,
            TributaryError::Config(_) => "tributary::config",
            TributaryError::Fetch(_) => "tributary::fetch",
            TributaryError::Selection(_) => "tributary::selection",
            TributaryError::Export(_) => "tributary::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            TributaryError::Fetch(FetchError::UnknownProduct(_)) => {
                "products are the subdirectories of the catalog directory"
            }
            TributaryError::Fetch(FetchError::UnknownVersion { .. }) => {
                "versions are stored as v<N>.json inside the product directory"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A decode error with source location information.
    Snapshot(SnapshotAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Snapshot(s) => fmt::Display::fmt(s, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Snapshot(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Snapshot(s) => s.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Snapshot(s) => s.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Snapshot(s) => s.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Snapshot(s) => s.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`TributaryError`] into a list of reportable errors.
///
/// Decode failures carry their source text and become a
/// [`Reportable::Snapshot`]; a catalog decode failure is reported as the
/// fetch error followed by the positioned decode error.
pub fn to_reportables(err: &TributaryError) -> Vec<Reportable<'_>> {
    match err {
        TributaryError::Snapshot { err, src } => {
            vec![Reportable::Snapshot(SnapshotAdapter::new(err, src))]
        }
        TributaryError::Fetch(FetchError::Decode { src, source, .. }) => vec![
            Reportable::Error(ErrorAdapter(err)),
            Reportable::Snapshot(SnapshotAdapter::new(source, src)),
        ],
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}
