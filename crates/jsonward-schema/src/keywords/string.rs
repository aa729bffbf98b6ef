//! String assertions: code-point lengths and ECMA-262 patterns.
//!
//! `minLength`/`maxLength` count Unicode code points, not UTF-8 bytes —
//! `"héllo"` has length 5. `pattern` is evaluated with the ECMA-262 regex
//! dialect JSON Schema specifies (via `regress`), not Rust's native `regex`
//! semantics; constructs like lookbehind differ between the two, and this
//! is a conformance requirement, not a style choice.

use serde_json::Value;

/// Compile a schema-supplied pattern under ECMA-262 semantics.
///
/// A malformed pattern is a problem with the schema, not the instance; the
/// engine reports the returned message as a violation at the keyword's own
/// schema location rather than crashing.
pub(crate) fn compile_pattern(pattern: &str) -> Result<regress::Regex, String> {
    regress::Regex::new(pattern).map_err(|e| {
        format!("pattern {pattern:?} is not a valid ECMA-262 regular expression: {e}")
    })
}

pub(crate) fn pattern_matches(regex: &regress::Regex, text: &str) -> bool {
    regex.find(text).is_some()
}

pub(crate) fn check_pattern(pattern: &Value, instance: &str) -> Option<String> {
    let pattern = pattern.as_str()?;
    match compile_pattern(pattern) {
        Ok(regex) => {
            if pattern_matches(&regex, instance) {
                None
            } else {
                Some(format!("{instance:?} does not match pattern {pattern:?}"))
            }
        }
        Err(message) => Some(message),
    }
}

pub(crate) fn check_max_length(limit: &Value, instance: &str) -> Option<String> {
    let limit = super::count_limit(limit)?;
    let length = instance.chars().count() as u64;
    if length > limit {
        return Some(format!(
            "{instance:?} is longer than {limit} characters (length {length})"
        ));
    }
    None
}

pub(crate) fn check_min_length(limit: &Value, instance: &str) -> Option<String> {
    let limit = super::count_limit(limit)?;
    let length = instance.chars().count() as u64;
    if length < limit {
        return Some(format!(
            "{instance:?} is shorter than {limit} characters (length {length})"
        ));
    }
    None
}
