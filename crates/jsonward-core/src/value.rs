//! # Document Model Semantics
//!
//! jsonward represents both schemas and instances as `serde_json::Value`.
//! With the `preserve_order` feature enabled, objects keep insertion order,
//! which the engine relies on for deterministic keyword-declaration-order
//! evaluation and for round-tripping documents unchanged.
//!
//! What serde_json does *not* provide is the equality rule JSON Schema
//! needs: `enum`, `const`, and `uniqueItems` compare by numeric value, so
//! `1.0` and `1` are equal even though their `Number` representations
//! differ. This module owns that rule, plus the type-name vocabulary used
//! in violation messages.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::error::ParseError;

/// Parse raw text into a document.
///
/// # Errors
///
/// Returns [`ParseError`] with the parser's line/column on malformed syntax.
pub fn parse_document(text: &str) -> Result<Value, ParseError> {
    serde_json::from_str(text).map_err(ParseError::from)
}

/// Serialize a document back to compact canonical text.
///
/// Object key order is preserved (insertion order), so
/// `parse_document(&serialize_document(&v))` reproduces `v` exactly.
pub fn serialize_document(value: &Value) -> String {
    value.to_string()
}

/// The JSON Schema type name of a value, as used in violation messages
/// and matched by the `type` keyword.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// True if the number has zero fractional part, regardless of encoding.
///
/// `5`, `5.0`, and `-3e2` are all integers under the `type: "integer"`
/// keyword; `5.5` is not.
pub fn is_integer(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.fract() == 0.0 && f.is_finite())
}

/// Compare two JSON numbers by numeric value.
///
/// Integer-to-integer comparisons are exact (via `i128` widening); any
/// comparison involving a float goes through `f64`. Returns `None` only
/// for non-finite floats, which JSON text cannot produce.
pub fn number_cmp(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_i128(a), as_i128(b)) {
        return Some(x.cmp(&y));
    }
    let x = a.as_f64()?;
    let y = b.as_f64()?;
    x.partial_cmp(&y)
}

/// True if two JSON numbers are numerically equal (`1.0 == 1`).
pub fn number_eq(a: &Number, b: &Number) -> bool {
    // Exact integer path first so u64 values above 2^53 are not rounded.
    if let (Some(x), Some(y)) = (as_i128(a), as_i128(b)) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn as_i128(n: &Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    // A float with zero fraction in i64 range still compares as an integer.
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= -9.007_199_254_740_992e15 && f <= 9.007_199_254_740_992e15 {
        return Some(f as i128);
    }
    None
}

/// Structural equality under JSON Schema semantics.
///
/// Numbers compare by value, arrays elementwise in order, and objects by
/// key set regardless of key order. This is the equality used by `enum`,
/// `const`, and `uniqueItems`.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => number_eq(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| json_equal(v, w))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| json_equal(v, w)))
        }
        _ => false,
    }
}
