//! # Meta-Schema Bootstrap
//!
//! Ships the Draft 2020-12 meta-schema and its vocabulary documents as
//! embedded JSON, and wires them into a [`Registry`] so arbitrary schema
//! documents can be validated by the same engine that validates instances.
//!
//! [`validate_schema_document`] is deliberately thin: the candidate schema
//! becomes the instance, `{"$ref": <meta-schema URI>}` becomes the schema,
//! and the ordinary entry point does the rest. The meta-schema validating
//! itself terminates because every `$dynamicRef "#meta"` recursion applies
//! to a strictly smaller instance subtree.

use serde_json::Value;

use crate::engine::validate;
use crate::outcome::ValidationOutcome;
use crate::registry::{Registry, RegistryError, ResolutionError};

/// Canonical URI of the JSON Schema Draft 2020-12 meta-schema.
pub const DRAFT_2020_12_URI: &str = "https://json-schema.org/draft/2020-12/schema";

/// The embedded meta-schema corpus: the dialect document plus the seven
/// vocabulary documents it composes via `allOf`.
const EMBEDDED: &[(&str, &str)] = &[
    (
        DRAFT_2020_12_URI,
        include_str!("../schemas/draft2020-12/schema.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/core",
        include_str!("../schemas/draft2020-12/meta/core.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/applicator",
        include_str!("../schemas/draft2020-12/meta/applicator.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/unevaluated",
        include_str!("../schemas/draft2020-12/meta/unevaluated.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/validation",
        include_str!("../schemas/draft2020-12/meta/validation.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/meta-data",
        include_str!("../schemas/draft2020-12/meta/meta-data.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/format-annotation",
        include_str!("../schemas/draft2020-12/meta/format-annotation.json"),
    ),
    (
        "https://json-schema.org/draft/2020-12/meta/content",
        include_str!("../schemas/draft2020-12/meta/content.json"),
    ),
];

impl Registry {
    /// A registry pre-populated with the Draft 2020-12 meta-schema corpus.
    ///
    /// Each validation session constructs its own registry; there is no
    /// process-wide bootstrapped state to interfere across sessions.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded documents are corrupted, which means a
    /// broken build rather than a caller mistake.
    pub fn with_draft_2020_12() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (uri, text) in EMBEDDED {
            let document: Value = serde_json::from_str(text).map_err(|e| {
                RegistryError::MalformedDocument {
                    uri: (*uri).to_string(),
                    reason: e.to_string(),
                }
            })?;
            registry.register(uri, document)?;
        }
        Ok(registry)
    }
}

/// Validate a candidate schema document against the Draft 2020-12
/// meta-schema.
///
/// The registry must contain the meta-schema corpus (use
/// [`Registry::with_draft_2020_12`]); a registry without it fails with an
/// unresolved-reference error rather than silently passing.
///
/// # Errors
///
/// [`ResolutionError`] on registry/resolution failures; schema defects are
/// reported through the returned [`ValidationOutcome`], keyed by their
/// location within the candidate document.
pub fn validate_schema_document(
    candidate: &Value,
    registry: &Registry,
) -> Result<ValidationOutcome, ResolutionError> {
    let wrapper = serde_json::json!({ "$ref": DRAFT_2020_12_URI });
    validate(&wrapper, candidate, registry)
}
