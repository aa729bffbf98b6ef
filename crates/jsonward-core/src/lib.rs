//! # jsonward-core — Foundational Types for jsonward
//!
//! The leaf crate of the jsonward workspace. It defines the document model
//! semantics and path primitives that the schema validation engine in
//! `jsonward-schema` is built on; it depends on nothing internal.
//!
//! ## Key Design Decisions
//!
//! 1. **`serde_json::Value` is the document model.** Both schemas and
//!    instances are plain JSON trees. The `preserve_order` feature keeps
//!    object keys in insertion order, which makes parse/serialize a true
//!    round trip and keyword evaluation order deterministic.
//!
//! 2. **Equality lives here, not in serde_json.** JSON Schema compares
//!    numbers by value (`1.0 == 1`), which serde_json's `PartialEq` does
//!    not. [`json_equal`] is the single equality rule used by `enum`,
//!    `const`, and `uniqueItems`.
//!
//! 3. **Paths are typed.** [`JsonPointer`] carries key/index tokens and
//!    renders with RFC 6901 escaping; violation locations are never built
//!    by string concatenation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsonward-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod pointer;
pub mod value;

pub use error::{ParseError, PointerError};
pub use pointer::{JsonPointer, PathToken};
pub use value::{
    is_integer, json_equal, json_type_name, number_cmp, number_eq, parse_document,
    serialize_document,
};
