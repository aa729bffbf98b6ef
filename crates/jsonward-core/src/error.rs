//! # Error Types — Document-Level Failures
//!
//! Errors raised before validation even starts: malformed document text
//! and malformed JSON Pointer strings. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! Constraint *violations* are not errors — they are data, collected by
//! the engine in `jsonward-schema` and returned as a structured outcome.

use thiserror::Error;

/// A document could not be parsed as JSON.
///
/// Carries the position reported by the underlying parser so callers can
/// point at the offending text. Parsing fails before any validation runs.
#[derive(Error, Debug)]
#[error("malformed JSON document at line {line}, column {column}: {source}")]
pub struct ParseError {
    /// 1-based line of the syntax error.
    pub line: usize,
    /// 1-based column of the syntax error.
    pub column: usize,
    /// The underlying parser diagnostic.
    #[source]
    pub source: serde_json::Error,
}

impl From<serde_json::Error> for ParseError {
    fn from(source: serde_json::Error) -> Self {
        Self {
            line: source.line(),
            column: source.column(),
            source,
        }
    }
}

/// A JSON Pointer string does not conform to RFC 6901.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// A non-empty pointer must begin with `/`.
    #[error("invalid JSON pointer {0:?}: non-empty pointers must start with '/'")]
    MissingLeadingSlash(String),

    /// A `~` escape was not followed by `0` or `1`.
    #[error("invalid JSON pointer {pointer:?}: bad escape in token {token:?}")]
    BadEscape {
        /// The full pointer string.
        pointer: String,
        /// The token containing the bad escape.
        token: String,
    },
}
