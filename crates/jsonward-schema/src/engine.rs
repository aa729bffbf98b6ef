//! # Validation Engine — Recursive Descent over (Schema, Instance)
//!
//! [`validate`] is the sole public entry point: it walks a schema node
//! against an instance node, dispatching assertion keywords to the
//! evaluators in [`crate::keywords`] and recursing through applicators
//! itself. Evaluation never stops at the first violation — every keyword
//! present runs, so one call reports every independent failure.
//!
//! ## Evaluation state
//!
//! Nothing persists between calls. Each call carries a private [`State`]:
//! the instance path and schema path (extended and popped around every
//! descent so violations land on their exact location), the dynamic-scope
//! stack `$dynamicRef` resolves against, and the set of reference
//! expansions currently on the call stack.
//!
//! ## Cycle detection
//!
//! An expansion is keyed by (target URI#fragment, instance path).
//! Re-entering the same target at the same instance location can never
//! terminate and raises [`ResolutionError::CyclicReference`]; re-entering
//! it at a deeper location is ordinary recursion (the meta-schema does
//! this constantly) and is allowed.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use jsonward_core::JsonPointer;

use crate::keywords::{array, count_limit, fmt_value, general, numeric, object, string};
use crate::outcome::{ValidationOutcome, Violation};
use crate::registry::{
    collect_resources, Registry, ResolutionError, ResourceSet, SchemaResource,
};

/// Base URI assigned to a schema passed directly to [`validate`] without
/// an `$id` of its own.
pub(crate) const ROOT_URI: &str = "urn:jsonward:root";

/// Validate `instance` against `schema`, resolving references through
/// `registry`.
///
/// The schema does not need to be registered: its resources (own `$id`,
/// embedded `$id` subtrees, anchors) are collected into a per-call overlay
/// consulted before the registry, mirroring how an ad-hoc payload schema
/// is handed to a validator session.
///
/// # Errors
///
/// Returns [`ResolutionError`] for structural failures of the setup —
/// unresolvable or cyclic references, unusable URIs. Constraint mismatches
/// are never errors; they are collected into the returned
/// [`ValidationOutcome`].
pub fn validate(
    schema: &Value,
    instance: &Value,
    registry: &Registry,
) -> Result<ValidationOutcome, ResolutionError> {
    let collected = collect_resources(ROOT_URI, schema.clone())?;
    let root_uri = collected[0].uri().to_string();
    let mut overlay: HashMap<String, SchemaResource> = HashMap::new();
    for resource in collected {
        overlay.insert(resource.uri().to_string(), resource);
    }
    let evaluator = Evaluator {
        resources: ResourceSet {
            registry,
            overlay: Some(&overlay),
        },
    };
    let mut state = State::new();
    state.dynamic_scope.push(root_uri.clone());
    let violations = evaluator.eval(&mut state, schema, instance, &root_uri)?;
    Ok(ValidationOutcome::from_violations(violations))
}

struct State {
    instance_path: JsonPointer,
    schema_path: JsonPointer,
    dynamic_scope: Vec<String>,
    in_flight: HashSet<(String, String)>,
}

impl State {
    fn new() -> Self {
        Self {
            instance_path: JsonPointer::root(),
            schema_path: JsonPointer::root(),
            dynamic_scope: Vec::new(),
            in_flight: HashSet::new(),
        }
    }

    fn violation(&self, message: impl Into<String>) -> Violation {
        Violation {
            instance_path: self.instance_path.clone(),
            schema_path: self.schema_path.clone(),
            message: message.into(),
        }
    }
}

struct Evaluator<'a> {
    resources: ResourceSet<'a>,
}

impl<'a> Evaluator<'a> {
    fn eval(
        &self,
        state: &mut State,
        schema: &'a Value,
        instance: &Value,
        base_uri: &str,
    ) -> Result<Vec<Violation>, ResolutionError> {
        match schema {
            Value::Bool(true) => Ok(Vec::new()),
            Value::Bool(false) => Ok(vec![state.violation("false schema allows nothing")]),
            Value::Object(map) => self.eval_object(state, map, instance, base_uri),
            // Not a schema; meta-validation is where this gets flagged.
            _ => Ok(Vec::new()),
        }
    }

    fn eval_object(
        &self,
        state: &mut State,
        map: &'a Map<String, Value>,
        instance: &Value,
        base_uri: &str,
    ) -> Result<Vec<Violation>, ResolutionError> {
        // An object with its own $id is a resource root: rebase relative
        // references and open a dynamic scope for its duration.
        let rebased;
        let (base_uri, entered_scope) = match map.get("$id").and_then(Value::as_str) {
            Some(id) => {
                rebased = crate::registry::resolve_uri(base_uri, id)?;
                state.dynamic_scope.push(rebased.clone());
                (rebased.as_str(), true)
            }
            None => (base_uri, false),
        };

        let mut out = Vec::new();
        let mut fatal = None;
        for (keyword, kw_value) in map {
            state.schema_path.push_key(keyword.clone());
            let applied =
                self.apply_keyword(state, map, keyword, kw_value, instance, base_uri, &mut out);
            state.schema_path.pop();
            if let Err(e) = applied {
                fatal = Some(e);
                break;
            }
        }

        if entered_scope {
            state.dynamic_scope.pop();
        }
        match fatal {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_keyword(
        &self,
        state: &mut State,
        map: &'a Map<String, Value>,
        keyword: &str,
        kw_value: &'a Value,
        instance: &Value,
        base_uri: &str,
        out: &mut Vec<Violation>,
    ) -> Result<(), ResolutionError> {
        match keyword {
            "$ref" => {
                if let Some(reference) = kw_value.as_str() {
                    out.extend(self.eval_ref(state, reference, instance, base_uri)?);
                }
            }
            "$dynamicRef" => {
                if let Some(reference) = kw_value.as_str() {
                    out.extend(self.eval_dynamic_ref(state, reference, instance, base_uri)?);
                }
            }

            // -- general assertions -------------------------------------
            "type" => push_opt(out, state, general::check_type(kw_value, instance)),
            "enum" => push_opt(out, state, general::check_enum(kw_value, instance)),
            "const" => push_opt(out, state, general::check_const(kw_value, instance)),

            // -- numeric assertions -------------------------------------
            "multipleOf" => {
                if let Value::Number(n) = instance {
                    push_opt(out, state, numeric::check_multiple_of(kw_value, n));
                }
            }
            "maximum" => {
                if let Value::Number(n) = instance {
                    push_opt(out, state, numeric::check_maximum(kw_value, n));
                }
            }
            "exclusiveMaximum" => {
                if let Value::Number(n) = instance {
                    push_opt(out, state, numeric::check_exclusive_maximum(kw_value, n));
                }
            }
            "minimum" => {
                if let Value::Number(n) = instance {
                    push_opt(out, state, numeric::check_minimum(kw_value, n));
                }
            }
            "exclusiveMinimum" => {
                if let Value::Number(n) = instance {
                    push_opt(out, state, numeric::check_exclusive_minimum(kw_value, n));
                }
            }

            // -- string assertions --------------------------------------
            "maxLength" => {
                if let Value::String(s) = instance {
                    push_opt(out, state, string::check_max_length(kw_value, s));
                }
            }
            "minLength" => {
                if let Value::String(s) = instance {
                    push_opt(out, state, string::check_min_length(kw_value, s));
                }
            }
            "pattern" => {
                if let Value::String(s) = instance {
                    push_opt(out, state, string::check_pattern(kw_value, s));
                }
            }

            // -- array assertions ---------------------------------------
            "maxItems" => {
                if let Value::Array(items) = instance {
                    push_opt(out, state, array::check_max_items(kw_value, items));
                }
            }
            "minItems" => {
                if let Value::Array(items) = instance {
                    push_opt(out, state, array::check_min_items(kw_value, items));
                }
            }
            "uniqueItems" => {
                if let Value::Array(items) = instance {
                    push_opt(out, state, array::check_unique_items(kw_value, items));
                }
            }

            // -- object assertions --------------------------------------
            "maxProperties" => {
                if let Value::Object(obj) = instance {
                    push_opt(out, state, object::check_max_properties(kw_value, obj));
                }
            }
            "minProperties" => {
                if let Value::Object(obj) = instance {
                    push_opt(out, state, object::check_min_properties(kw_value, obj));
                }
            }
            "required" => {
                if let Value::Object(obj) = instance {
                    for message in object::check_required(kw_value, obj) {
                        out.push(state.violation(message));
                    }
                }
            }
            "dependentRequired" => {
                if let Value::Object(obj) = instance {
                    for message in object::check_dependent_required(kw_value, obj) {
                        out.push(state.violation(message));
                    }
                }
            }

            // -- combinators --------------------------------------------
            "allOf" => {
                if let Value::Array(subs) = kw_value {
                    for (index, sub) in subs.iter().enumerate() {
                        state.schema_path.push_index(index);
                        let result = self.eval(state, sub, instance, base_uri);
                        state.schema_path.pop();
                        out.extend(result?);
                    }
                }
            }
            "anyOf" => {
                if let Value::Array(subs) = kw_value {
                    self.eval_any_of(state, subs, instance, base_uri, out)?;
                }
            }
            "oneOf" => {
                if let Value::Array(subs) = kw_value {
                    self.eval_one_of(state, subs, instance, base_uri, out)?;
                }
            }
            "not" => {
                let sub_violations = self.eval(state, kw_value, instance, base_uri)?;
                if sub_violations.is_empty() {
                    out.push(state.violation(format!(
                        "{} is valid under a schema it must not match",
                        fmt_value(instance)
                    )));
                }
            }
            "if" => {
                // Violations from the condition itself are never reported;
                // it only selects which of then/else applies.
                let condition_holds = self.eval(state, kw_value, instance, base_uri)?.is_empty();
                let branch = if condition_holds { "then" } else { "else" };
                if let Some(sub) = map.get(branch) {
                    state.schema_path.pop();
                    state.schema_path.push_key(branch);
                    let result = self.eval(state, sub, instance, base_uri);
                    state.schema_path.pop();
                    state.schema_path.push_key("if");
                    out.extend(result?);
                }
            }

            // -- array applicators --------------------------------------
            "prefixItems" => {
                if let (Value::Array(subs), Value::Array(items)) = (kw_value, instance) {
                    for (index, (sub, item)) in subs.iter().zip(items).enumerate() {
                        state.schema_path.push_index(index);
                        state.instance_path.push_index(index);
                        let result = self.eval(state, sub, item, base_uri);
                        state.instance_path.pop();
                        state.schema_path.pop();
                        out.extend(result?);
                    }
                }
            }
            "items" => {
                if let Value::Array(items) = instance {
                    let skip = map
                        .get("prefixItems")
                        .and_then(Value::as_array)
                        .map_or(0, Vec::len);
                    for (index, item) in items.iter().enumerate().skip(skip) {
                        state.instance_path.push_index(index);
                        let result = self.eval(state, kw_value, item, base_uri);
                        state.instance_path.pop();
                        out.extend(result?);
                    }
                }
            }
            "contains" => {
                if let Value::Array(items) = instance {
                    self.eval_contains(state, map, kw_value, items, base_uri, out)?;
                }
            }

            // -- object applicators -------------------------------------
            "properties" => {
                if let (Value::Object(subs), Value::Object(obj)) = (kw_value, instance) {
                    for (name, sub) in subs {
                        let Some(member) = obj.get(name) else {
                            continue;
                        };
                        state.schema_path.push_key(name.clone());
                        state.instance_path.push_key(name.clone());
                        let result = self.eval(state, sub, member, base_uri);
                        state.instance_path.pop();
                        state.schema_path.pop();
                        out.extend(result?);
                    }
                }
            }
            "patternProperties" => {
                if let (Value::Object(subs), Value::Object(obj)) = (kw_value, instance) {
                    for (pattern, sub) in subs {
                        state.schema_path.push_key(pattern.clone());
                        let compiled = string::compile_pattern(pattern);
                        match compiled {
                            Err(message) => {
                                out.push(state.violation(message));
                                state.schema_path.pop();
                            }
                            Ok(regex) => {
                                let mut result = Ok(());
                                for (name, member) in obj {
                                    if !string::pattern_matches(&regex, name) {
                                        continue;
                                    }
                                    state.instance_path.push_key(name.clone());
                                    let evaluated = self.eval(state, sub, member, base_uri);
                                    state.instance_path.pop();
                                    match evaluated {
                                        Ok(v) => out.extend(v),
                                        Err(e) => {
                                            result = Err(e);
                                            break;
                                        }
                                    }
                                }
                                state.schema_path.pop();
                                result?;
                            }
                        }
                    }
                }
            }
            "additionalProperties" => {
                if let Value::Object(obj) = instance {
                    self.eval_additional_properties(state, map, kw_value, obj, base_uri, out)?;
                }
            }
            "propertyNames" => {
                if let Value::Object(obj) = instance {
                    for name in obj.keys() {
                        let name_value = Value::String(name.clone());
                        state.instance_path.push_key(name.clone());
                        let result = self.eval(state, kw_value, &name_value, base_uri);
                        state.instance_path.pop();
                        out.extend(result?);
                    }
                }
            }
            "dependentSchemas" => {
                if let (Value::Object(subs), Value::Object(obj)) = (kw_value, instance) {
                    for (trigger, sub) in subs {
                        if !obj.contains_key(trigger) {
                            continue;
                        }
                        state.schema_path.push_key(trigger.clone());
                        let result = self.eval(state, sub, instance, base_uri);
                        state.schema_path.pop();
                        out.extend(result?);
                    }
                }
            }

            // Consumed by their partner keyword above.
            "then" | "else" | "minContains" | "maxContains" | "$id" => {}

            // Unknown keywords (including annotations and the remaining
            // $-keywords) are ignored: schemas are open for extension.
            _ => {}
        }
        Ok(())
    }

    fn eval_ref(
        &self,
        state: &mut State,
        reference: &str,
        instance: &Value,
        base_uri: &str,
    ) -> Result<Vec<Violation>, ResolutionError> {
        let (resource, node) = self.resources.resolve_ref(base_uri, reference)?;
        self.eval_referenced(state, resource, node, reference, instance)
    }

    fn eval_dynamic_ref(
        &self,
        state: &mut State,
        reference: &str,
        instance: &Value,
        base_uri: &str,
    ) -> Result<Vec<Violation>, ResolutionError> {
        let fragment = reference.split_once('#').map(|(_, f)| f).unwrap_or("");
        if !fragment.is_empty() && !fragment.starts_with('/') {
            if let Some((resource, node)) =
                self.resources.resolve_dynamic(&state.dynamic_scope, fragment)
            {
                return self.eval_referenced(state, resource, node, reference, instance);
            }
        }
        // No matching $dynamicAnchor anywhere in scope: plain $ref behavior.
        self.eval_ref(state, reference, instance, base_uri)
    }

    /// Shared tail of `$ref`/`$dynamicRef`: cycle bookkeeping, dynamic
    /// scope push/pop, recursion into the resolved node.
    fn eval_referenced(
        &self,
        state: &mut State,
        resource: &'a SchemaResource,
        node: &'a Value,
        reference: &str,
        instance: &Value,
    ) -> Result<Vec<Violation>, ResolutionError> {
        let fragment = reference.split_once('#').map(|(_, f)| f).unwrap_or("");
        let key = (
            format!("{}#{fragment}", resource.uri()),
            state.instance_path.to_string(),
        );
        if !state.in_flight.insert(key.clone()) {
            return Err(ResolutionError::CyclicReference {
                reference: key.0,
                instance_path: key.1,
            });
        }
        state.dynamic_scope.push(resource.uri().to_string());
        let result = self.eval(state, node, instance, resource.uri());
        state.dynamic_scope.pop();
        state.in_flight.remove(&key);
        result
    }

    fn eval_any_of(
        &self,
        state: &mut State,
        subs: &'a [Value],
        instance: &Value,
        base_uri: &str,
        out: &mut Vec<Violation>,
    ) -> Result<(), ResolutionError> {
        // Every branch runs even after a match, so an unresolvable $ref in
        // a later branch is fatal for every instance, not just failing ones.
        let mut matched = false;
        let mut branch_failures = Vec::new();
        for (index, sub) in subs.iter().enumerate() {
            state.schema_path.push_index(index);
            let result = self.eval(state, sub, instance, base_uri);
            state.schema_path.pop();
            let violations = result?;
            if violations.is_empty() {
                matched = true;
            } else {
                branch_failures.push(violations);
            }
        }
        if !matched {
            out.push(state.violation(format!(
                "{} does not match any \"anyOf\" branch: {}",
                fmt_value(instance),
                summarize_branches(&branch_failures)
            )));
        }
        Ok(())
    }

    fn eval_one_of(
        &self,
        state: &mut State,
        subs: &'a [Value],
        instance: &Value,
        base_uri: &str,
        out: &mut Vec<Violation>,
    ) -> Result<(), ResolutionError> {
        let mut matching = Vec::new();
        let mut branch_failures = Vec::new();
        for (index, sub) in subs.iter().enumerate() {
            state.schema_path.push_index(index);
            let result = self.eval(state, sub, instance, base_uri);
            state.schema_path.pop();
            let violations = result?;
            if violations.is_empty() {
                matching.push(index);
            } else {
                branch_failures.push(violations);
            }
        }
        match matching.len() {
            1 => {}
            0 => out.push(state.violation(format!(
                "{} does not match any \"oneOf\" branch: {}",
                fmt_value(instance),
                summarize_branches(&branch_failures)
            ))),
            _ => out.push(state.violation(format!(
                "{} matches more than one \"oneOf\" branch (branches {})",
                fmt_value(instance),
                matching
                    .iter()
                    .map(usize::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
        Ok(())
    }

    fn eval_contains(
        &self,
        state: &mut State,
        map: &'a Map<String, Value>,
        sub: &'a Value,
        items: &[Value],
        base_uri: &str,
        out: &mut Vec<Violation>,
    ) -> Result<(), ResolutionError> {
        // Counts every matching element; minContains/maxContains need the
        // full count, not just the first hit.
        let mut matched: u64 = 0;
        for (index, item) in items.iter().enumerate() {
            state.instance_path.push_index(index);
            let result = self.eval(state, sub, item, base_uri);
            state.instance_path.pop();
            if result?.is_empty() {
                matched += 1;
            }
        }
        let min = map.get("minContains").and_then(count_limit).unwrap_or(1);
        let max = map.get("maxContains").and_then(count_limit);
        if matched < min {
            if matched == 0 && min == 1 {
                out.push(
                    state.violation("array contains no item matching the \"contains\" schema"),
                );
            } else {
                out.push(state.violation(format!(
                    "array contains {matched} matching item(s), fewer than minContains {min}"
                )));
            }
        }
        if let Some(max) = max {
            if matched > max {
                out.push(state.violation(format!(
                    "array contains {matched} matching item(s), more than maxContains {max}"
                )));
            }
        }
        Ok(())
    }

    fn eval_additional_properties(
        &self,
        state: &mut State,
        map: &'a Map<String, Value>,
        sub: &'a Value,
        obj: &Map<String, Value>,
        base_uri: &str,
        out: &mut Vec<Violation>,
    ) -> Result<(), ResolutionError> {
        let named = map.get("properties").and_then(Value::as_object);
        // Malformed sibling patterns are reported by patternProperties
        // itself; here they simply match nothing.
        let patterns: Vec<regress::Regex> = map
            .get("patternProperties")
            .and_then(Value::as_object)
            .map(|subs| {
                subs.keys()
                    .filter_map(|p| string::compile_pattern(p).ok())
                    .collect()
            })
            .unwrap_or_default();
        for (name, member) in obj {
            if named.is_some_and(|p| p.contains_key(name)) {
                continue;
            }
            if patterns.iter().any(|re| string::pattern_matches(re, name)) {
                continue;
            }
            state.instance_path.push_key(name.clone());
            let result = self.eval(state, sub, member, base_uri);
            state.instance_path.pop();
            out.extend(result?);
        }
        Ok(())
    }
}

fn push_opt(out: &mut Vec<Violation>, state: &State, message: Option<String>) {
    if let Some(message) = message {
        out.push(state.violation(message));
    }
}

/// First message of each failed branch, for anyOf/oneOf summaries.
fn summarize_branches(failures: &[Vec<Violation>]) -> String {
    failures
        .iter()
        .enumerate()
        .map(|(index, violations)| match violations.first() {
            Some(v) => format!("branch {index}: {}", v.message),
            None => format!("branch {index}"),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(schema: Value, instance: Value) -> ValidationOutcome {
        let registry = Registry::new();
        validate(&schema, &instance, &registry).expect("resolution should succeed")
    }

    #[test]
    fn test_true_schema_accepts_everything() {
        for instance in [json!(null), json!(42), json!({"a": [1, 2]})] {
            assert!(check(json!(true), instance).is_valid());
        }
    }

    #[test]
    fn test_false_schema_rejects_everything_at_root() {
        let outcome = check(json!(false), json!("anything"));
        let messages = outcome.messages_at("").expect("root violation");
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_all_keywords_evaluated_no_fail_fast() {
        let outcome = check(
            json!({"type": "string", "minLength": 5, "enum": ["long enough"]}),
            json!(7),
        );
        // type and enum both fail; minLength does not apply to numbers.
        assert_eq!(outcome.violation_count(), 2);
    }

    #[test]
    fn test_duplicate_constraint_yields_two_messages() {
        let outcome = check(
            json!({"allOf": [{"minimum": 10}, {"minimum": 10}]}),
            json!(3),
        );
        assert_eq!(outcome.messages_at("").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_nested_violations_carry_instance_paths() {
        let outcome = check(
            json!({
                "properties": {
                    "name": {"type": "string"},
                    "tags": {"items": {"type": "string"}}
                }
            }),
            json!({"name": 5, "tags": ["ok", 9]}),
        );
        assert!(outcome.messages_at("/name").is_some());
        assert!(outcome.messages_at("/tags/1").is_some());
        assert!(outcome.messages_at("/tags/0").is_none());
    }

    #[test]
    fn test_any_of_aggregates_branch_failures() {
        let schema = json!({"anyOf": [{"type": "string"}, {"type": "number"}]});
        assert!(check(schema.clone(), json!("x")).is_valid());
        assert!(check(schema.clone(), json!(42)).is_valid());
        let outcome = check(schema, json!(true));
        let messages = outcome.messages_at("").expect("aggregated violation");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("branch 0"));
        assert!(messages[0].contains("branch 1"));
    }

    #[test]
    fn test_any_of_surfaces_setup_errors_in_later_branches() {
        // A matching first branch must not mask a broken second branch.
        let schema = json!({
            "anyOf": [{"type": "number"}, {"$ref": "https://example.com/missing"}]
        });
        let err = validate(&schema, &json!(1), &Registry::new())
            .expect_err("unresolved reference is fatal regardless of other branches");
        assert!(matches!(err, ResolutionError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_float_encoded_limits_enforced() {
        // Meta-validation accepts 3.0 as an integer, so evaluation must too.
        assert!(!check(json!({"maxLength": 3.0}), json!("abcdef")).is_valid());
        assert!(!check(json!({"minItems": 2.0}), json!([1])).is_valid());
        let schema = json!({"contains": {"type": "number"}, "minContains": 2.0});
        assert!(!check(schema, json!([1, "a"])).is_valid());
    }

    #[test]
    fn test_one_of_rejects_multiple_matches() {
        let schema = json!({"oneOf": [{"multipleOf": 2}, {"multipleOf": 3}]});
        assert!(check(schema.clone(), json!(4)).is_valid());
        let outcome = check(schema, json!(6));
        let messages = outcome.messages_at("").expect("both branches matched");
        assert!(messages[0].contains("more than one"));
    }

    #[test]
    fn test_if_violations_are_discarded() {
        let schema = json!({
            "if": {"type": "number", "minimum": 100},
            "then": {"multipleOf": 10},
            "else": {"type": "number"}
        });
        // Condition fails: its minimum violation must not leak out.
        assert!(check(schema.clone(), json!(5)).is_valid());
        // Condition holds, then-branch fails.
        let outcome = check(schema.clone(), json!(105));
        assert_eq!(outcome.violation_count(), 1);
        // Condition fails, else-branch fails.
        assert!(!check(schema, json!("text")).is_valid());
    }

    #[test]
    fn test_not_combinator() {
        let schema = json!({"not": {"type": "string"}});
        assert!(check(schema.clone(), json!(1)).is_valid());
        assert!(!check(schema, json!("s")).is_valid());
    }

    #[test]
    fn test_prefix_items_then_items() {
        let schema = json!({
            "prefixItems": [{"type": "string"}, {"type": "number"}],
            "items": {"type": "boolean"}
        });
        assert!(check(schema.clone(), json!(["a", 1, true, false])).is_valid());
        let outcome = check(schema, json!(["a", 1, "not-bool"]));
        assert!(outcome.messages_at("/2").is_some());
    }

    #[test]
    fn test_contains_counts_all_matches() {
        let schema = json!({
            "contains": {"type": "number"},
            "minContains": 2,
            "maxContains": 3
        });
        assert!(check(schema.clone(), json!([1, "a", 2])).is_valid());
        assert!(!check(schema.clone(), json!([1, "a"])).is_valid());
        assert!(!check(schema, json!([1, 2, 3, 4])).is_valid());
    }

    #[test]
    fn test_min_contains_zero_allows_empty() {
        let schema = json!({"contains": {"type": "number"}, "minContains": 0});
        assert!(check(schema, json!(["a", "b"])).is_valid());
    }

    #[test]
    fn test_additional_properties_respects_siblings() {
        let schema = json!({
            "properties": {"name": {"type": "string"}},
            "patternProperties": {"^x-": true},
            "additionalProperties": false
        });
        assert!(check(schema.clone(), json!({"name": "a", "x-ext": 1})).is_valid());
        let outcome = check(schema, json!({"name": "a", "other": 1}));
        let messages = outcome.messages_at("/other").expect("additional property");
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_property_names() {
        let schema = json!({"propertyNames": {"pattern": "^[a-z]+$"}});
        assert!(check(schema.clone(), json!({"abc": 1})).is_valid());
        assert!(!check(schema, json!({"Not Lower": 1})).is_valid());
    }

    #[test]
    fn test_dependent_schemas() {
        let schema = json!({
            "dependentSchemas": {
                "credit_card": {"required": ["billing_address"]}
            }
        });
        assert!(check(schema.clone(), json!({"name": "x"})).is_valid());
        assert!(!check(schema, json!({"credit_card": "4111"})).is_valid());
    }

    #[test]
    fn test_unknown_keywords_ignored() {
        let outcome = check(
            json!({"x-vendor-extension": {"whatever": 1}, "type": "number"}),
            json!(3),
        );
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_ref_siblings_are_evaluated() {
        let mut registry = Registry::new();
        registry
            .register("https://example.com/num", json!({"type": "number"}))
            .expect("registration");
        let schema = json!({"$ref": "https://example.com/num", "minimum": 10});
        let outcome =
            validate(&schema, &json!(3), &registry).expect("resolution should succeed");
        // The $ref target passes; the sibling minimum still fails.
        assert_eq!(outcome.violation_count(), 1);
    }

    #[test]
    fn test_internal_ref_into_defs() {
        let schema = json!({
            "$defs": {"positive": {"type": "number", "exclusiveMinimum": 0}},
            "properties": {"count": {"$ref": "#/$defs/positive"}}
        });
        assert!(check(schema.clone(), json!({"count": 5})).is_valid());
        let outcome = check(schema, json!({"count": -1}));
        let messages = outcome.messages_at("/count").expect("negative rejected");
        assert!(messages[0].contains("exclusiveMinimum"));
    }

    #[test]
    fn test_cyclic_refs_error_instead_of_overflow() {
        let mut registry = Registry::new();
        registry
            .register("https://example.com/a", json!({"$ref": "https://example.com/b"}))
            .expect("registration");
        registry
            .register("https://example.com/b", json!({"$ref": "https://example.com/a"}))
            .expect("registration");
        let schema = json!({"$ref": "https://example.com/a"});
        let err = validate(&schema, &json!(1), &registry).expect_err("cycle must be fatal");
        assert!(matches!(err, ResolutionError::CyclicReference { .. }));
    }

    #[test]
    fn test_self_referential_schema_recurses_on_nested_instances() {
        // A tree schema referencing itself is legitimate recursion, not a
        // cycle: each expansion happens at a deeper instance path.
        let schema = json!({
            "$id": "https://example.com/tree",
            "type": "object",
            "properties": {
                "value": {"type": "number"},
                "children": {"items": {"$ref": "https://example.com/tree"}}
            }
        });
        let instance = json!({
            "value": 1,
            "children": [{"value": 2, "children": [{"value": 3}]}]
        });
        assert!(check(schema.clone(), instance).is_valid());
        let bad = json!({"value": 1, "children": [{"value": "nope"}]});
        let outcome = check(schema, bad);
        assert!(outcome.messages_at("/children/0/value").is_some());
    }

    #[test]
    fn test_dynamic_ref_resolves_outermost_scope() {
        // The classic tree/strict-tree extension case: child nodes are
        // re-validated against whichever outermost document supplies the
        // "node" dynamic anchor.
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/tree",
                json!({
                    "$id": "https://example.com/tree",
                    "$dynamicAnchor": "node",
                    "type": "object",
                    "properties": {
                        "data": true,
                        "children": {"type": "array", "items": {"$dynamicRef": "#node"}}
                    }
                }),
            )
            .expect("registration");
        registry
            .register(
                "https://example.com/strict-tree",
                json!({
                    "$id": "https://example.com/strict-tree",
                    "$dynamicAnchor": "node",
                    "$ref": "https://example.com/tree",
                    "properties": {"data": {"type": "number"}}
                }),
            )
            .expect("registration");

        let instance = json!({"data": 1, "children": [{"data": "oops"}]});

        // Entered through strict-tree, its "node" anchor is outermost, so
        // the nested child's data must also be numeric.
        let strict = json!({"$ref": "https://example.com/strict-tree"});
        let outcome = validate(&strict, &instance, &registry).expect("resolution");
        assert!(outcome.messages_at("/children/0/data").is_some());

        // Entered through tree alone, data is unconstrained.
        let plain = json!({"$ref": "https://example.com/tree"});
        let outcome = validate(&plain, &instance, &registry).expect("resolution");
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_unresolved_reference_is_fatal() {
        let schema = json!({"$ref": "https://example.com/never-registered"});
        let err = validate(&schema, &json!(1), &Registry::new())
            .expect_err("unknown URI must fail");
        assert!(matches!(err, ResolutionError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let schema = json!({
            "type": "object",
            "required": ["a", "b"],
            "properties": {"a": {"type": "number", "minimum": 3}}
        });
        let instance = json!({"a": 1});
        let first = check(schema.clone(), instance.clone());
        for _ in 0..5 {
            assert_eq!(check(schema.clone(), instance.clone()), first);
        }
    }
}
