//! Array shape assertions that need no recursion: item counts and
//! uniqueness. `items`/`prefixItems`/`contains` recurse into subschemas
//! and live in the engine.

use serde_json::Value;

use jsonward_core::json_equal;

use super::{count_limit, fmt_value};

pub(crate) fn check_max_items(limit: &Value, items: &[Value]) -> Option<String> {
    let limit = count_limit(limit)?;
    if items.len() as u64 > limit {
        return Some(format!(
            "array has more than {limit} items (length {})",
            items.len()
        ));
    }
    None
}

pub(crate) fn check_min_items(limit: &Value, items: &[Value]) -> Option<String> {
    let limit = count_limit(limit)?;
    if (items.len() as u64) < limit {
        return Some(format!(
            "array has fewer than {limit} items (length {})",
            items.len()
        ));
    }
    None
}

/// `uniqueItems: true` — pairwise structural comparison under the same
/// equality rule as `enum`/`const`, so `[1, 1.0]` is a duplicate.
pub(crate) fn check_unique_items(flag: &Value, items: &[Value]) -> Option<String> {
    if flag != &Value::Bool(true) {
        return None;
    }
    for (i, a) in items.iter().enumerate() {
        for (j, b) in items.iter().enumerate().skip(i + 1) {
            if json_equal(a, b) {
                return Some(format!(
                    "array items are not unique: items {i} and {j} are both {}",
                    fmt_value(a)
                ));
            }
        }
    }
    None
}
