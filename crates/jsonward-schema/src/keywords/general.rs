//! `type`, `enum`, and `const` — assertions that apply to every instance
//! shape, using the document model's equality rule.

use serde_json::Value;

use jsonward_core::{is_integer, json_equal, json_type_name};

use super::fmt_value;

/// `type`: a single type name or a set of names. `integer` matches any
/// number with zero fractional part regardless of encoding.
pub(crate) fn check_type(expected: &Value, instance: &Value) -> Option<String> {
    let matches = |name: &str| match name {
        "integer" => matches!(instance, Value::Number(n) if is_integer(n)),
        other => json_type_name(instance) == other,
    };
    match expected {
        Value::String(name) => {
            if matches(name) {
                None
            } else {
                Some(format!("{} is not of type {name:?}", fmt_value(instance)))
            }
        }
        Value::Array(names) => {
            let any = names
                .iter()
                .filter_map(Value::as_str)
                .any(matches);
            if any {
                None
            } else {
                let listed = names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|n| format!("{n:?}"))
                    .collect::<Vec<_>>()
                    .join(" or ");
                Some(format!("{} is not of type {listed}", fmt_value(instance)))
            }
        }
        // A malformed `type` value asserts nothing; meta-validation flags it.
        _ => None,
    }
}

/// `enum`: the instance must equal one member, by structural equality.
pub(crate) fn check_enum(allowed: &Value, instance: &Value) -> Option<String> {
    let Value::Array(members) = allowed else {
        return None;
    };
    if members.iter().any(|m| json_equal(m, instance)) {
        return None;
    }
    let listed = members
        .iter()
        .map(fmt_value)
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "{} is not one of [{listed}]",
        fmt_value(instance)
    ))
}

/// `const`: the instance must equal the given value.
pub(crate) fn check_const(expected: &Value, instance: &Value) -> Option<String> {
    if json_equal(expected, instance) {
        return None;
    }
    Some(format!(
        "{} does not equal the required constant {}",
        fmt_value(instance),
        fmt_value(expected)
    ))
}
