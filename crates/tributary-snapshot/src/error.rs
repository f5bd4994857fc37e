//! Error types for snapshot decoding.
//!
//! Every failure is a single [`SnapshotError`] carrying an [`ErrorCode`], a
//! message, and, when the failure can be pinned to the input text, a
//! [`Location`] that front ends use to underline the offending bytes.
//!
//! Error codes are organized by phase:
//! - `E1xx` - JSON syntax errors
//! - `E2xx` - Shape errors (valid JSON, wrong structure)

use std::fmt;

use thiserror::Error;

/// Error codes for categorizing decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed JSON.
    E100,

    /// The input ended before the JSON document was complete.
    E101,

    /// The document does not have the snapshot shape: a missing field, a
    /// wrong type, or an unknown node role.
    E200,
}

impl ErrorCode {
    /// Returns a short remediation hint for the code.
    pub fn help(self) -> Option<&'static str> {
        match self {
            ErrorCode::E100 | ErrorCode::E101 => None,
            ErrorCode::E200 => Some(
                "a snapshot needs `nodes`, `version`, and optionally `links` and `versions`; \
                 node `type` is one of source, transformation, target",
            ),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Position of an error in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    line: usize,
    column: usize,
    offset: usize,
}

impl Location {
    /// Builds a location from a 1-based line and column, resolving the byte
    /// offset against `source`. Out-of-range positions clamp to the end, and
    /// offsets inside a multi-byte character move back to its start.
    pub fn resolve(source: &str, line: usize, column: usize) -> Self {
        let line_start: usize = source
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();
        let mut offset = (line_start + column.saturating_sub(1)).min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        Self {
            line,
            column,
            offset,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Byte offset into the source.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// A snapshot decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SnapshotError {
    code: ErrorCode,
    message: String,
    location: Option<Location>,
}

impl SnapshotError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Attaches a source location (builder style).
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Converts a `serde_json` failure, keeping its position.
    pub(crate) fn from_json(err: &serde_json::Error, source: &str) -> Self {
        use serde_json::error::Category;

        let code = match err.classify() {
            Category::Eof => ErrorCode::E101,
            Category::Data => ErrorCode::E200,
            Category::Syntax | Category::Io => ErrorCode::E100,
        };

        // serde_json appends " at line X column Y"; the location carries that.
        let message = err.to_string();
        let message = message
            .rsplit_once(" at line ")
            .map_or(message.as_str(), |(head, _)| head)
            .to_string();

        let error = Self::new(code, message);
        if err.line() == 0 {
            error
        } else {
            error.with_location(Location::resolve(source, err.line(), err.column()))
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn help(&self) -> Option<&'static str> {
        self.code.help()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_resolves_offset() {
        let source = "{\n  \"nodes\": [\n    oops\n}";
        let location = Location::resolve(source, 3, 5);

        assert_eq!(location.line(), 3);
        assert_eq!(location.column(), 5);
        assert_eq!(&source[location.offset()..location.offset() + 4], "oops");
    }

    #[test]
    fn test_location_clamps_past_end() {
        let location = Location::resolve("{}", 9, 9);
        assert_eq!(location.offset(), 2);
    }

    #[test]
    fn test_error_display_is_message() {
        let err = SnapshotError::new(ErrorCode::E200, "missing field `version`");

        assert_eq!(err.to_string(), "missing field `version`");
        assert_eq!(err.code(), ErrorCode::E200);
        assert!(err.help().is_some());
        assert!(err.location().is_none());
    }
}
