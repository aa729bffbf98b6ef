//! # jsonward-schema — JSON Schema Draft 2020-12 Validation Engine
//!
//! Validates arbitrary JSON instances against arbitrary Draft 2020-12
//! schemas, resolving `$ref`/`$dynamicRef` through a pre-populated
//! [`Registry`], and reports *every* violation in one pass as a mapping
//! from instance JSON Pointer to the messages recorded there.
//!
//! ## Entry points
//!
//! - [`validate`] — schema + instance + registry → [`ValidationOutcome`].
//! - [`validate_schema_document`] — validates a candidate schema against
//!   the Draft 2020-12 meta-schema (use [`Registry::with_draft_2020_12`]).
//!
//! ```
//! use serde_json::json;
//! use jsonward_schema::{validate, Registry};
//!
//! let registry = Registry::new();
//! let schema = json!({"type": "object", "required": ["name"]});
//! let outcome = validate(&schema, &json!({}), &registry).unwrap();
//! assert!(!outcome.is_valid());
//! ```
//!
//! ## Design
//!
//! Violations are data, never errors: a constraint mismatch is collected
//! and evaluation continues, so the caller always receives the complete
//! picture. Errors ([`RegistryError`], [`ResolutionError`]) are reserved
//! for structural failures of the setup — duplicate registration,
//! unresolvable references, reference cycles.
//!
//! Resolution never touches the network: every `$ref` target must already
//! be in the registry (or be part of the schema handed to [`validate`]).
//!
//! ## Crate Policy
//!
//! - Depends only on `jsonward-core` internally.
//! - The registry is read-only during validation; one registry may serve
//!   any number of concurrent validation calls.
//! - No `unsafe` code; no `panic!()` or `.unwrap()` outside tests.

mod engine;
mod keywords;
mod metaschema;
mod outcome;
mod registry;

pub use engine::validate;
pub use metaschema::{validate_schema_document, DRAFT_2020_12_URI};
pub use outcome::{ValidationOutcome, Violation};
pub use registry::{Registry, RegistryError, ResolutionError, SchemaResource};
