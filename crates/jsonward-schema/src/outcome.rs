//! # Validation Outcomes
//!
//! A validation run produces an ordered list of [`Violation`]s; this module
//! folds that list into the caller-facing [`ValidationOutcome`]: either
//! `Valid`, or a mapping from instance JSON Pointer to every message
//! recorded at that location, in discovery order.
//!
//! Messages at one path are never deduplicated. Two distinct constraint
//! failures at the same location must both surface, even when their text
//! happens to coincide.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use jsonward_core::JsonPointer;

/// One constraint failure, attributed to an exact instance location and
/// the schema keyword that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Where in the instance the constraint failed.
    pub instance_path: JsonPointer,
    /// Which schema location (keyword) was violated.
    pub schema_path: JsonPointer,
    /// Human-readable description of the failure.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at {:?} (schema {:?}): {}",
            self.instance_path.to_string(),
            self.schema_path.to_string(),
            self.message
        )
    }
}

/// The result of one `validate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// No violations were collected.
    Valid,
    /// At least one violation; keyed by instance path, messages in
    /// discovery order (depth-first, keyword-declaration order).
    Invalid(IndexMap<String, Vec<String>>),
}

impl ValidationOutcome {
    /// Fold a violation list into an outcome.
    ///
    /// An empty list is `Valid`; otherwise every message is grouped under
    /// its instance path, first-seen path order preserved.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            return Self::Valid;
        }
        let mut by_path: IndexMap<String, Vec<String>> = IndexMap::new();
        for v in violations {
            by_path
                .entry(v.instance_path.to_string())
                .or_default()
                .push(v.message);
        }
        Self::Invalid(by_path)
    }

    /// True if no violations were recorded.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The messages recorded at one instance path, if any.
    pub fn messages_at(&self, instance_path: &str) -> Option<&[String]> {
        match self {
            Self::Valid => None,
            Self::Invalid(map) => map.get(instance_path).map(Vec::as_slice),
        }
    }

    /// Total number of messages across all paths.
    pub fn violation_count(&self) -> usize {
        match self {
            Self::Valid => 0,
            Self::Invalid(map) => map.values().map(Vec::len).sum(),
        }
    }
}

/// Serializes as the path-to-messages map; `Valid` is the empty map, so a
/// consumer can always treat the payload as `{path: [messages]}`.
impl Serialize for ValidationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Valid => serializer.collect_map(std::iter::empty::<(&String, &Vec<String>)>()),
            Self::Invalid(map) => map.serialize(serializer),
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Invalid(map) => {
                write!(f, "{} violation(s)", self.violation_count())?;
                for (path, messages) in map {
                    for message in messages {
                        write!(f, "\n  {path:?}: {message}")?;
                    }
                }
                Ok(())
            }
        }
    }
}
