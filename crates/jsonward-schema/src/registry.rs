//! # Schema Registry — Resources and Reference Resolution
//!
//! Stores schema resources keyed by canonical URI and resolves `$ref`,
//! anchor, and `$dynamicRef` targets against them. Resolution operates only
//! over what has been registered: there is no network retrieval, and a
//! reference to an unknown URI is an [`ResolutionError::UnresolvedReference`]
//! surfaced to the caller, never a silent fetch.
//!
//! ## Registration
//!
//! [`Registry::register`] scans the document once:
//!
//! - the document's own `$id` (resolved against the registration URI)
//!   becomes its canonical URI;
//! - every nested subschema carrying `$id` is split off as an embedded
//!   resource with its own canonical URI and anchor tables (only schema
//!   positions count: an `$id` inside `default` or `examples` is data);
//! - `$anchor` / `$dynamicAnchor` names are recorded with their JSON
//!   Pointer locations, attached to the nearest enclosing resource.
//!
//! Re-registering a canonical URI is rejected with
//! [`RegistryError::DuplicateResource`]; silent overwrite would let two
//! validation sessions disagree about what a URI means.
//!
//! ## Resolution
//!
//! `$ref` resolution is lexical: split the reference into URI and fragment,
//! resolve the URI part against the current base, look the resource up,
//! then walk the fragment (JSON Pointer or anchor name). `$dynamicRef`
//! resolution is a distinct algorithm over the dynamic scope stack: the
//! *outermost* in-scope resource defining a matching `$dynamicAnchor`
//! wins. The two are deliberately not implemented in terms of each other.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;
use url::Url;

use jsonward_core::JsonPointer;

/// Fatal failures while resolving references — structural problems with the
/// caller's setup, distinct from instance-data violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// A URI could not be parsed or resolved against its base.
    #[error("invalid URI {uri:?}: {reason}")]
    InvalidUri {
        /// The offending URI or URI-reference.
        uri: String,
        /// Why it could not be resolved.
        reason: String,
    },

    /// A reference points at a URI, pointer, or anchor that is not present.
    #[error("unresolved reference {reference:?}: {reason}")]
    UnresolvedReference {
        /// The `$ref`/`$dynamicRef` value as written in the schema.
        reference: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A reference chain re-entered a target it was already expanding at
    /// the same instance location.
    #[error("cyclic reference through {reference:?} at instance path {instance_path:?}")]
    CyclicReference {
        /// The reference target that closed the cycle (URI#fragment).
        reference: String,
        /// The instance location at which the cycle was detected.
        instance_path: String,
    },
}

/// Errors raised while populating a [`Registry`].
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The canonical URI is already registered; re-registration is
    /// rejected rather than overwritten.
    #[error("duplicate schema resource: {uri}")]
    DuplicateResource {
        /// The canonical URI that was already present.
        uri: String,
    },

    /// An embedded document shipped with the crate failed to parse.
    /// Only reachable if the build is corrupted.
    #[error("malformed embedded schema document {uri}: {reason}")]
    MalformedDocument {
        /// Identifier of the embedded document.
        uri: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// URI resolution failed during registration (e.g. a relative `$id`
    /// with an unusable base).
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// A registered schema document (or embedded subtree): its canonical URI,
/// its node, and the anchors it defines.
///
/// Created at registration time, immutable thereafter. Evaluators only
/// borrow the node.
#[derive(Debug, Clone)]
pub struct SchemaResource {
    uri: String,
    node: Value,
    anchors: HashMap<String, JsonPointer>,
    dynamic_anchors: HashMap<String, JsonPointer>,
}

impl SchemaResource {
    /// The canonical URI this resource is registered under.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The schema node (boolean or object).
    pub fn node(&self) -> &Value {
        &self.node
    }

    /// Location of a `$dynamicAnchor` with the given name, if defined.
    pub(crate) fn dynamic_anchor(&self, name: &str) -> Option<&JsonPointer> {
        self.dynamic_anchors.get(name)
    }

    fn anchor(&self, name: &str) -> Option<&JsonPointer> {
        // A $dynamicAnchor is also addressable as a plain anchor.
        self.anchors.get(name).or_else(|| self.dynamic_anchors.get(name))
    }
}

/// Mapping from canonical URI to schema resource; the sole source of truth
/// for reference resolution during a validation session.
///
/// Populated up front, read-only during validation. Concurrent validations
/// may share one registry because nothing mutates it after registration.
#[derive(Debug, Default)]
pub struct Registry {
    resources: HashMap<String, SchemaResource>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema document under the given URI.
    ///
    /// The document's own `$id` (if any, resolved against `uri`) takes
    /// precedence as the canonical URI. Embedded subtrees with their own
    /// `$id` are registered as additional resources.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateResource`] if any resulting canonical URI
    /// is already present (the registry is left unchanged in that case).
    pub fn register(&mut self, uri: &str, document: Value) -> Result<(), RegistryError> {
        let resources = collect_resources(uri, document)?;
        for resource in &resources {
            if self.resources.contains_key(&resource.uri) {
                return Err(RegistryError::DuplicateResource {
                    uri: resource.uri.clone(),
                });
            }
        }
        for resource in resources {
            tracing::debug!(
                uri = %resource.uri,
                anchors = resource.anchors.len(),
                dynamic_anchors = resource.dynamic_anchors.len(),
                "registered schema resource"
            );
            self.resources.insert(resource.uri.clone(), resource);
        }
        Ok(())
    }

    /// Look up a resource by canonical URI.
    pub fn resource(&self, uri: &str) -> Option<&SchemaResource> {
        self.resources.get(uri)
    }

    /// Number of registered resources (embedded resources included).
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resolve a `$ref` value against a base URI. See [`ResourceSet::resolve_ref`].
    pub fn resolve_ref(
        &self,
        base_uri: &str,
        reference: &str,
    ) -> Result<(&SchemaResource, &Value), ResolutionError> {
        ResourceSet {
            registry: self,
            overlay: None,
        }
        .resolve_ref(base_uri, reference)
    }

    /// Resolve a `$dynamicRef` anchor name over a dynamic scope stack
    /// (outermost first). See [`ResourceSet::resolve_dynamic`].
    pub fn resolve_dynamic_ref(
        &self,
        anchor: &str,
        scope: &[String],
    ) -> Option<(&SchemaResource, &Value)> {
        ResourceSet {
            registry: self,
            overlay: None,
        }
        .resolve_dynamic(scope, anchor)
    }
}

/// The registry plus a per-call overlay holding the resources of a schema
/// passed directly to `validate` without prior registration.
///
/// The overlay is consulted first, so an ad-hoc root schema can reference
/// its own embedded resources while still reaching everything registered.
#[derive(Clone, Copy)]
pub(crate) struct ResourceSet<'a> {
    pub registry: &'a Registry,
    pub overlay: Option<&'a HashMap<String, SchemaResource>>,
}

impl<'a> ResourceSet<'a> {
    pub(crate) fn get(&self, uri: &str) -> Option<&'a SchemaResource> {
        self.overlay
            .and_then(|o| o.get(uri))
            .or_else(|| self.registry.resources.get(uri))
    }

    /// Lexical `$ref` resolution: URI part joined against `base_uri`,
    /// fragment walked as a JSON Pointer or looked up as an anchor.
    pub(crate) fn resolve_ref(
        &self,
        base_uri: &str,
        reference: &str,
    ) -> Result<(&'a SchemaResource, &'a Value), ResolutionError> {
        let (uri_part, fragment) = split_fragment(reference);
        let target_uri = if uri_part.is_empty() {
            canonical_uri(base_uri)
        } else {
            resolve_uri(base_uri, uri_part)?
        };
        let resource = self.get(&target_uri).ok_or_else(|| {
            ResolutionError::UnresolvedReference {
                reference: reference.to_string(),
                reason: format!("no schema resource registered for {target_uri}"),
            }
        })?;
        tracing::trace!(reference, target = %target_uri, "resolved $ref");
        let node = resolve_fragment(resource, fragment, reference)?;
        Ok((resource, node))
    }

    /// Dynamic-scope resolution for `$dynamicRef`: walk the scope from
    /// outermost to innermost and return the first resource defining a
    /// `$dynamicAnchor` with the requested name.
    pub(crate) fn resolve_dynamic(
        &self,
        scope: &[String],
        anchor: &str,
    ) -> Option<(&'a SchemaResource, &'a Value)> {
        for uri in scope {
            let Some(resource) = self.get(uri) else {
                continue;
            };
            if let Some(location) = resource.dynamic_anchor(anchor) {
                let node = location.lookup(resource.node())?;
                tracing::trace!(anchor, resource = %resource.uri, "resolved $dynamicRef");
                return Some((resource, node));
            }
        }
        None
    }
}

fn split_fragment(reference: &str) -> (&str, &str) {
    match reference.split_once('#') {
        Some((uri, fragment)) => (uri, fragment),
        None => (reference, ""),
    }
}

fn resolve_fragment<'a>(
    resource: &'a SchemaResource,
    fragment: &str,
    reference: &str,
) -> Result<&'a Value, ResolutionError> {
    if fragment.is_empty() {
        return Ok(resource.node());
    }
    if fragment.starts_with('/') {
        let pointer = JsonPointer::parse(fragment).map_err(|e| {
            ResolutionError::UnresolvedReference {
                reference: reference.to_string(),
                reason: e.to_string(),
            }
        })?;
        return pointer.lookup(resource.node()).ok_or_else(|| {
            ResolutionError::UnresolvedReference {
                reference: reference.to_string(),
                reason: format!("pointer {fragment:?} not found in {}", resource.uri()),
            }
        });
    }
    let location = resource.anchor(fragment).ok_or_else(|| {
        ResolutionError::UnresolvedReference {
            reference: reference.to_string(),
            reason: format!("anchor {fragment:?} not defined in {}", resource.uri()),
        }
    })?;
    location.lookup(resource.node()).ok_or_else(|| {
        ResolutionError::UnresolvedReference {
            reference: reference.to_string(),
            reason: format!("anchor {fragment:?} location missing in {}", resource.uri()),
        }
    })
}

/// Normalize a URI to the form used as a registry key.
pub(crate) fn canonical_uri(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(parsed) => {
            let mut s = parsed.to_string();
            // Canonical URIs carry no fragment; an empty one is stripped.
            if let Some(stripped) = s.strip_suffix('#') {
                s = stripped.to_string();
            }
            s
        }
        Err(_) => uri.to_string(),
    }
}

/// Resolve a URI-reference against a base, per RFC 3986.
pub(crate) fn resolve_uri(base: &str, reference: &str) -> Result<String, ResolutionError> {
    if let Ok(absolute) = Url::parse(reference) {
        return Ok(canonical_uri(absolute.as_str()));
    }
    let base_url = Url::parse(base).map_err(|e| ResolutionError::InvalidUri {
        uri: base.to_string(),
        reason: e.to_string(),
    })?;
    let joined = base_url
        .join(reference)
        .map_err(|e| ResolutionError::InvalidUri {
            uri: reference.to_string(),
            reason: format!("cannot resolve against {base}: {e}"),
        })?;
    Ok(canonical_uri(joined.as_str()))
}

/// Split a document into its schema resources: the document itself plus
/// every embedded subtree carrying its own `$id`.
pub(crate) fn collect_resources(
    base_uri: &str,
    document: Value,
) -> Result<Vec<SchemaResource>, ResolutionError> {
    let uri = match document.get("$id").and_then(Value::as_str) {
        Some(id) => resolve_uri(base_uri, id)?,
        None => canonical_uri(base_uri),
    };
    let mut out = Vec::new();
    let mut resource = SchemaResource {
        uri: uri.clone(),
        node: document,
        anchors: HashMap::new(),
        dynamic_anchors: HashMap::new(),
    };
    let mut anchors = HashMap::new();
    let mut dynamic_anchors = HashMap::new();
    scan_node(
        &uri,
        &resource.node,
        JsonPointer::root(),
        true,
        &mut anchors,
        &mut dynamic_anchors,
        &mut out,
    )?;
    resource.anchors = anchors;
    resource.dynamic_anchors = dynamic_anchors;
    out.insert(0, resource);
    Ok(out)
}

/// Depth-first scan recording anchors and splitting off embedded `$id`
/// subtrees. Only schema positions are descended: a keyword whose value is
/// data (`enum`, `const`, `default`, `examples`, unknown keywords) may
/// contain an `$id`-shaped string without creating a resource.
fn scan_node(
    resource_uri: &str,
    node: &Value,
    location: JsonPointer,
    is_resource_root: bool,
    anchors: &mut HashMap<String, JsonPointer>,
    dynamic_anchors: &mut HashMap<String, JsonPointer>,
    embedded: &mut Vec<SchemaResource>,
) -> Result<(), ResolutionError> {
    let Value::Object(map) = node else {
        return Ok(());
    };
    if !is_resource_root && map.get("$id").and_then(Value::as_str).is_some() {
        // Embedded resource: it owns this subtree, anchors included.
        embedded.extend(collect_resources(resource_uri, node.clone())?);
        return Ok(());
    }
    if let Some(name) = map.get("$anchor").and_then(Value::as_str) {
        anchors.insert(name.to_string(), location.clone());
    }
    if let Some(name) = map.get("$dynamicAnchor").and_then(Value::as_str) {
        dynamic_anchors.insert(name.to_string(), location.clone());
    }
    for (key, child) in map {
        let mut child_location = location.clone();
        child_location.push_key(key.clone());
        match key.as_str() {
            // The keyword's value is itself a schema.
            "additionalProperties" | "items" | "contains" | "propertyNames" | "if" | "then"
            | "else" | "not" | "contentSchema" | "unevaluatedItems"
            | "unevaluatedProperties" => {
                scan_node(
                    resource_uri,
                    child,
                    child_location,
                    false,
                    anchors,
                    dynamic_anchors,
                    embedded,
                )?;
            }
            // The keyword's value maps names to schemas.
            "$defs" | "definitions" | "properties" | "patternProperties"
            | "dependentSchemas" => {
                if let Value::Object(members) = child {
                    for (name, member) in members {
                        let mut member_location = child_location.clone();
                        member_location.push_key(name.clone());
                        scan_node(
                            resource_uri,
                            member,
                            member_location,
                            false,
                            anchors,
                            dynamic_anchors,
                            embedded,
                        )?;
                    }
                }
            }
            // The keyword's value is an array of schemas.
            "allOf" | "anyOf" | "oneOf" | "prefixItems" => {
                if let Value::Array(items) = child {
                    for (index, item) in items.iter().enumerate() {
                        let mut item_location = child_location.clone();
                        item_location.push_index(index);
                        scan_node(
                            resource_uri,
                            item,
                            item_location,
                            false,
                            anchors,
                            dynamic_anchors,
                            embedded,
                        )?;
                    }
                }
            }
            // Everything else carries data, not schemas.
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_lookup_by_canonical_id() {
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/schemas/person",
                json!({"$id": "https://example.com/schemas/person", "type": "object"}),
            )
            .expect("registration should succeed");
        assert_eq!(registry.len(), 1);
        assert!(registry.resource("https://example.com/schemas/person").is_some());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = Registry::new();
        registry
            .register("https://example.com/a", json!({"type": "string"}))
            .expect("first registration");
        let err = registry
            .register("https://example.com/a", json!({"type": "number"}))
            .expect_err("duplicate must be rejected");
        assert!(matches!(err, RegistryError::DuplicateResource { .. }));
        // Original resource untouched.
        let resource = registry.resource("https://example.com/a").unwrap();
        assert_eq!(resource.node()["type"], json!("string"));
    }

    #[test]
    fn test_relative_id_resolved_against_registration_uri() {
        let mut registry = Registry::new();
        registry
            .register("https://example.com/base/root", json!({"$id": "sibling"}))
            .expect("registration");
        assert!(registry.resource("https://example.com/base/sibling").is_some());
    }

    #[test]
    fn test_resolve_ref_pointer_fragment() {
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/defs",
                json!({"$defs": {"positive": {"type": "number", "exclusiveMinimum": 0}}}),
            )
            .expect("registration");
        let (resource, node) = registry
            .resolve_ref("https://example.com/defs", "#/$defs/positive")
            .expect("pointer fragment should resolve");
        assert_eq!(resource.uri(), "https://example.com/defs");
        assert_eq!(node["exclusiveMinimum"], json!(0));
    }

    #[test]
    fn test_resolve_ref_relative_uri_against_base() {
        let mut registry = Registry::new();
        registry
            .register("https://example.com/a/one", json!({"type": "string"}))
            .expect("registration");
        let (_, node) = registry
            .resolve_ref("https://example.com/a/two", "one")
            .expect("relative reference should resolve");
        assert_eq!(node["type"], json!("string"));
    }

    #[test]
    fn test_resolve_ref_anchor_fragment() {
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/anchored",
                json!({"$defs": {"name": {"$anchor": "name", "type": "string"}}}),
            )
            .expect("registration");
        let (_, node) = registry
            .resolve_ref("https://example.com/anchored", "#name")
            .expect("anchor should resolve");
        assert_eq!(node["type"], json!("string"));
    }

    #[test]
    fn test_unknown_uri_is_unresolved_not_fetched() {
        let registry = Registry::new();
        let err = registry
            .resolve_ref("https://example.com/x", "https://example.com/absent")
            .expect_err("must not fetch");
        assert!(matches!(err, ResolutionError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_missing_pointer_is_unresolved() {
        let mut registry = Registry::new();
        registry
            .register("https://example.com/doc", json!({"a": {"b": 1}}))
            .expect("registration");
        let err = registry
            .resolve_ref("https://example.com/doc", "#/a/missing")
            .expect_err("absent pointer");
        assert!(matches!(err, ResolutionError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_embedded_id_becomes_own_resource() {
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/bundle",
                json!({
                    "$defs": {
                        "inner": {
                            "$id": "https://example.com/inner",
                            "$anchor": "here",
                            "type": "integer"
                        }
                    }
                }),
            )
            .expect("registration");
        assert_eq!(registry.len(), 2);
        let (resource, node) = registry
            .resolve_ref("https://example.com/bundle", "https://example.com/inner#here")
            .expect("embedded anchor");
        assert_eq!(resource.uri(), "https://example.com/inner");
        assert_eq!(node["type"], json!("integer"));
    }

    #[test]
    fn test_anchor_inside_embedded_resource_not_on_parent() {
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/outer",
                json!({
                    "$defs": {"inner": {"$id": "nested", "$anchor": "deep"}}
                }),
            )
            .expect("registration");
        let err = registry
            .resolve_ref("https://example.com/outer", "#deep")
            .expect_err("anchor belongs to the embedded resource");
        assert!(matches!(err, ResolutionError::UnresolvedReference { .. }));
        assert!(registry
            .resolve_ref("https://example.com/outer", "nested#deep")
            .is_ok());
    }

    #[test]
    fn test_enum_values_are_not_scanned_for_ids() {
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/enums",
                json!({"enum": [{"$id": "https://example.com/not-a-schema"}]}),
            )
            .expect("registration");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_id_inside_annotation_is_data_not_a_resource() {
        // Two schemas may share a default value that happens to contain an
        // $id-shaped member; neither registration owns that URI.
        let shared = json!({"$id": "https://example.com/shared"});
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/first",
                json!({"type": "object", "default": shared.clone()}),
            )
            .expect("first registration");
        registry
            .register(
                "https://example.com/second",
                json!({"type": "object", "default": shared}),
            )
            .expect("a default value is data, not an embedded resource");
        assert_eq!(registry.len(), 2);
        assert!(registry.resource("https://example.com/shared").is_none());
    }

    #[test]
    fn test_anchor_inside_examples_is_not_recorded() {
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/doc",
                json!({"examples": [{"$anchor": "ghost"}]}),
            )
            .expect("registration");
        let err = registry
            .resolve_ref("https://example.com/doc", "#ghost")
            .expect_err("anchors in example data are not addressable");
        assert!(matches!(err, ResolutionError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_schema_positions_still_scanned_for_anchors() {
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/positions",
                json!({
                    "allOf": [{"$anchor": "first"}],
                    "items": {"$anchor": "second"},
                    "properties": {"a": {"$anchor": "third"}}
                }),
            )
            .expect("registration");
        for anchor in ["#first", "#second", "#third"] {
            assert!(
                registry
                    .resolve_ref("https://example.com/positions", anchor)
                    .is_ok(),
                "{anchor} should resolve"
            );
        }
    }

    #[test]
    fn test_dynamic_resolution_prefers_outermost() {
        let mut registry = Registry::new();
        registry
            .register(
                "https://example.com/outer-scope",
                json!({"$dynamicAnchor": "node", "type": "object"}),
            )
            .expect("registration");
        registry
            .register(
                "https://example.com/inner-scope",
                json!({"$dynamicAnchor": "node", "type": "string"}),
            )
            .expect("registration");
        let scope = vec![
            "https://example.com/outer-scope".to_string(),
            "https://example.com/inner-scope".to_string(),
        ];
        let (resource, _) = registry
            .resolve_dynamic_ref("node", &scope)
            .expect("dynamic anchor in scope");
        assert_eq!(resource.uri(), "https://example.com/outer-scope");
    }

    #[test]
    fn test_dynamic_resolution_skips_scopes_without_anchor() {
        let mut registry = Registry::new();
        registry
            .register("https://example.com/plain", json!({"type": "object"}))
            .expect("registration");
        registry
            .register(
                "https://example.com/anchored",
                json!({"$dynamicAnchor": "node", "type": "string"}),
            )
            .expect("registration");
        let scope = vec![
            "https://example.com/plain".to_string(),
            "https://example.com/anchored".to_string(),
        ];
        let (resource, _) = registry
            .resolve_dynamic_ref("node", &scope)
            .expect("anchored scope entry");
        assert_eq!(resource.uri(), "https://example.com/anchored");
    }
}
