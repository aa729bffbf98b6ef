//! # Keyword Evaluators
//!
//! One pure function per assertion keyword, grouped by family. Each takes
//! the keyword's schema value and the instance node and returns messages;
//! the engine owns path bookkeeping and turns messages into violations.
//!
//! Keywords that recurse into subschemas (combinators, `items`,
//! `properties`, ...) live in the engine, which owns the recursion; this
//! module is the leaf assertions only. The keyword→evaluator mapping is a
//! closed `match` in the engine — no reflection, no open registry.
//!
//! Unrecognized keywords are ignored everywhere: schemas are open for
//! extension, so an unknown keyword is never an error.

pub(crate) mod array;
pub(crate) mod general;
pub(crate) mod numeric;
pub(crate) mod object;
pub(crate) mod string;

use serde_json::Value;

/// Read a count limit (`maxLength`, `minItems`, `minContains`, ...): any
/// non-negative JSON number with zero fractional part, however encoded.
/// `3.0` is as good a limit as `3`, matching what `type: "integer"`
/// accepts. Anything else asserts nothing; meta-validation flags it.
pub(crate) fn count_limit(value: &Value) -> Option<u64> {
    let n = value.as_number()?;
    if let Some(u) = n.as_u64() {
        return Some(u);
    }
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 {
        return Some(f as u64);
    }
    None
}

/// Render an instance value for a violation message, truncated so a huge
/// document fragment cannot flood the output.
pub(crate) fn fmt_value(value: &Value) -> String {
    const LIMIT: usize = 60;
    let text = value.to_string();
    if text.chars().count() <= LIMIT {
        return text;
    }
    let truncated: String = text.chars().take(LIMIT).collect();
    format!("{truncated}...")
}
