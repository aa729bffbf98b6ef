//! Object shape assertions that need no recursion: presence and counting.
//! `properties`/`patternProperties`/`additionalProperties`/`propertyNames`/
//! `dependentSchemas` recurse into subschemas and live in the engine.

use serde_json::{Map, Value};

pub(crate) fn check_required(names: &Value, object: &Map<String, Value>) -> Vec<String> {
    let Value::Array(names) = names else {
        return Vec::new();
    };
    names
        .iter()
        .filter_map(Value::as_str)
        .filter(|name| !object.contains_key(*name))
        .map(|name| format!("required property {name:?} is missing"))
        .collect()
}

/// `dependentRequired`: if a trigger key is present, its listed
/// dependencies must be present too.
pub(crate) fn check_dependent_required(
    dependencies: &Value,
    object: &Map<String, Value>,
) -> Vec<String> {
    let Value::Object(dependencies) = dependencies else {
        return Vec::new();
    };
    let mut messages = Vec::new();
    for (trigger, needed) in dependencies {
        if !object.contains_key(trigger) {
            continue;
        }
        let Value::Array(needed) = needed else {
            continue;
        };
        for name in needed.iter().filter_map(Value::as_str) {
            if !object.contains_key(name) {
                messages.push(format!(
                    "property {name:?} is required when {trigger:?} is present"
                ));
            }
        }
    }
    messages
}

pub(crate) fn check_max_properties(limit: &Value, object: &Map<String, Value>) -> Option<String> {
    let limit = super::count_limit(limit)?;
    if object.len() as u64 > limit {
        return Some(format!(
            "object has more than {limit} properties ({})",
            object.len()
        ));
    }
    None
}

pub(crate) fn check_min_properties(limit: &Value, object: &Map<String, Value>) -> Option<String> {
    let limit = super::count_limit(limit)?;
    if (object.len() as u64) < limit {
        return Some(format!(
            "object has fewer than {limit} properties ({})",
            object.len()
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        v.as_object().cloned().expect("object fixture")
    }

    #[test]
    fn test_required_reports_each_missing_name() {
        let obj = object(json!({"a": 1}));
        let messages = check_required(&json!(["a", "b", "c"]), &obj);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("\"b\""));
        assert!(messages[1].contains("\"c\""));
    }

    #[test]
    fn test_dependent_required_only_fires_when_trigger_present() {
        let deps = json!({"credit_card": ["billing_address"]});
        assert!(check_dependent_required(&deps, &object(json!({"name": "x"}))).is_empty());
        let messages =
            check_dependent_required(&deps, &object(json!({"credit_card": "4111"})));
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("billing_address"));
    }

    #[test]
    fn test_property_count_bounds() {
        let obj = object(json!({"a": 1, "b": 2}));
        assert!(check_max_properties(&json!(2), &obj).is_none());
        assert!(check_max_properties(&json!(1), &obj).is_some());
        assert!(check_min_properties(&json!(3), &obj).is_some());
    }

    #[test]
    fn test_float_encoded_property_limits_enforced() {
        let obj = object(json!({"a": 1, "b": 2}));
        assert!(check_max_properties(&json!(1.0), &obj).is_some());
        assert!(check_min_properties(&json!(3.0), &obj).is_some());
    }
}
