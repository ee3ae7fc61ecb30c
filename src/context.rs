//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Evaluation context
//!
//! One `ValidationContext` frame exists per schema object being evaluated
//! against one instance location. Applicator keywords derive child frames
//! for their subschemas; a child is mutation-isolated, and only successful
//! children merge their evaluated-property and evaluated-item marks back
//! into the parent. Per-validation shared state (the local registry, the
//! visited-reference set, the options) lives in a `ValidationScope` shared
//! across frames of one call.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;
use url::Url;

use crate::annotations::AnnotationValue;
use crate::config::ValidationOptions;
use crate::error::SchemaResult;
use crate::pointer::JsonPointer;
use crate::registry::{LocalRegistry, SchemaRegistry};
use crate::result::ValidationResult;
use crate::schema::SchemaDocument;

/// The dynamic scope recorded by `$recursiveAnchor: true`
///
/// `$recursiveRef` retargets to the outermost such scope instead of the
/// lexically enclosing document.
#[derive(Clone)]
pub(crate) struct DynamicAnchor {
    pub base_uri: Option<Url>,
    pub document: Arc<SchemaDocument>,
}

/// Shared per-validation state
pub struct ValidationScope {
    options: ValidationOptions,
    registry: Arc<SchemaRegistry>,
    state: RefCell<ScopeState>,
}

struct ScopeState {
    local: LocalRegistry,
    visited_refs: HashSet<(String, String)>,
}

impl ValidationScope {
    /// Create a scope for one validation call
    pub fn new(options: ValidationOptions, registry: Arc<SchemaRegistry>) -> Rc<Self> {
        Rc::new(Self {
            options,
            registry,
            state: RefCell::new(ScopeState {
                local: LocalRegistry::new(),
                visited_refs: HashSet::new(),
            }),
        })
    }

    /// The options for this validation
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// The schema registry consulted during reference resolution
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Bind a schema into the local registry
    pub fn local_register(&self, uri: impl Into<String>, schema: Arc<SchemaDocument>) {
        self.state.borrow_mut().local.register(uri, schema);
    }

    /// Look up a schema in the local registry
    pub fn local_get(&self, uri: &str) -> Option<Arc<SchemaDocument>> {
        self.state.borrow().local.get(uri)
    }

    /// Walk a document, binding its ids and anchors into the local registry
    pub fn adopt_document(&self, document: &Arc<SchemaDocument>, base: Option<&Url>) {
        let mut state = self.state.borrow_mut();
        document.register_tree(base, &mut state.local);
    }

    /// Resolve a document URI through the local registry, the global
    /// registry, and finally the download hook
    ///
    /// A document pulled in from outside the local registry has its internal
    /// ids and anchors bound locally so fragment lookups can see them.
    pub fn resolve_document(&self, uri: &str) -> SchemaResult<Option<Arc<SchemaDocument>>> {
        if let Some(found) = self.local_get(uri) {
            return Ok(Some(found));
        }
        match self.registry.resolve(uri, &self.options)? {
            Some(found) => {
                tracing::debug!(uri, "resolved schema document");
                self.local_register(uri, Arc::clone(&found));
                let base = Url::parse(uri).ok();
                self.adopt_document(&found, base.as_ref());
                Ok(Some(found))
            }
            None => Ok(None),
        }
    }

    /// Record entry into a reference; returns false when the same reference
    /// was already entered at the same instance location (a cycle)
    pub fn enter_ref(&self, uri: &str, instance_location: &JsonPointer) -> bool {
        self.state
            .borrow_mut()
            .visited_refs
            .insert((uri.to_string(), instance_location.to_string()))
    }

    /// Record exit from a reference
    pub fn leave_ref(&self, uri: &str, instance_location: &JsonPointer) {
        self.state
            .borrow_mut()
            .visited_refs
            .remove(&(uri.to_string(), instance_location.to_string()));
    }
}

/// Per-frame evaluation state
pub struct ValidationContext<'i> {
    /// The sub-instance being evaluated
    pub instance: &'i Value,

    /// Path into the root instance
    pub instance_location: JsonPointer,

    /// Path of keywords traversed from the validation root
    pub relative_location: JsonPointer,

    /// Path from the resolved schema root; `None` once a reference crossed
    /// into a schema without a known absolute id
    pub base_relative_location: Option<JsonPointer>,

    /// Current absolute base for resolving relative references
    pub base_uri: Option<Url>,

    /// Root of the document currently being evaluated
    pub(crate) document: Option<Arc<SchemaDocument>>,

    /// Dynamic scope for `$recursiveRef`
    pub(crate) recursive_anchor: Option<DynamicAnchor>,

    annotations: HashMap<&'static str, AnnotationValue>,
    evaluated_properties: BTreeSet<String>,
    evaluated_items: usize,
    scope: Rc<ValidationScope>,
}

impl<'i> ValidationContext<'i> {
    /// Create the root frame for a validation call
    pub fn new(instance: &'i Value, base_uri: Option<Url>, scope: Rc<ValidationScope>) -> Self {
        Self {
            instance,
            instance_location: JsonPointer::root(),
            relative_location: JsonPointer::root(),
            base_relative_location: Some(JsonPointer::root()),
            base_uri,
            document: None,
            recursive_anchor: None,
            annotations: HashMap::new(),
            evaluated_properties: BTreeSet::new(),
            evaluated_items: 0,
            scope,
        }
    }

    /// The shared per-validation state
    pub fn scope(&self) -> &ValidationScope {
        &self.scope
    }

    /// The options for this validation
    pub fn options(&self) -> &ValidationOptions {
        self.scope.options()
    }

    /// Root of the document currently being evaluated
    pub fn document(&self) -> Option<Arc<SchemaDocument>> {
        self.document.clone()
    }

    /// Derive a child frame for a subschema evaluation
    ///
    /// `keyword_path` extends the keyword trail (e.g. `["properties", "a"]`);
    /// `instance_segment` extends the instance path when the subschema
    /// applies to a child of the current instance. The child starts with an
    /// empty annotation channel and empty evaluation marks.
    pub fn child<'c>(
        &self,
        instance: &'c Value,
        keyword_path: &[&str],
        instance_segment: Option<String>,
    ) -> ValidationContext<'c> {
        let instance_location = match instance_segment {
            Some(segment) => self.instance_location.append(segment),
            None => self.instance_location.clone(),
        };

        ValidationContext {
            instance,
            instance_location,
            relative_location: self.relative_location.append_all(keyword_path.iter().copied()),
            base_relative_location: self
                .base_relative_location
                .as_ref()
                .map(|p| p.append_all(keyword_path.iter().copied())),
            base_uri: self.base_uri.clone(),
            document: self.document.clone(),
            recursive_anchor: self.recursive_anchor.clone(),
            annotations: HashMap::new(),
            evaluated_properties: BTreeSet::new(),
            evaluated_items: 0,
            scope: Rc::clone(&self.scope),
        }
    }

    /// Merge a successful child's evaluation marks into this frame
    ///
    /// Called only after the child subschema validated; failed children are
    /// dropped without merging, keeping annotation growth monotonic.
    pub fn merge_child(&mut self, child: &ValidationContext<'_>) {
        for property in &child.evaluated_properties {
            self.evaluated_properties.insert(property.clone());
        }
        if child.evaluated_items > self.evaluated_items {
            self.evaluated_items = child.evaluated_items;
        }
    }

    /// Write an annotation for later keywords in this frame
    pub fn set_annotation(&mut self, key: &'static str, value: AnnotationValue) {
        self.annotations.insert(key, value);
    }

    /// Read an annotation written by an earlier keyword in this frame
    pub fn annotation(&self, key: &str) -> Option<&AnnotationValue> {
        self.annotations.get(key)
    }

    /// Mark one property as evaluated by an applicator
    pub fn mark_property_evaluated(&mut self, name: &str) {
        self.evaluated_properties.insert(name.to_string());
    }

    /// Raise the evaluated-items watermark
    pub fn mark_items_evaluated(&mut self, watermark: usize) {
        if watermark > self.evaluated_items {
            self.evaluated_items = watermark;
        }
    }

    /// Properties evaluated so far in this frame
    pub fn evaluated_properties(&self) -> &BTreeSet<String> {
        &self.evaluated_properties
    }

    /// Evaluated-items watermark for this frame
    pub fn evaluated_items(&self) -> usize {
        self.evaluated_items
    }

    /// Absolute schema location of the current frame plus extra segments
    pub fn absolute_location_of(&self, extra: &[&str]) -> Option<String> {
        let base = self.base_uri.as_ref()?;
        let relative = self.base_relative_location.as_ref()?;
        let pointer = relative.append_all(extra.iter().copied());
        let base_str = base.as_str().trim_end_matches('#');
        Some(format!("{}#{}", base_str, pointer))
    }

    /// A passing result node for one keyword of this frame
    pub fn keyword_result(&self, keyword: &str) -> ValidationResult {
        ValidationResult::new(
            Some(keyword.to_string()),
            self.instance_location.clone(),
            self.relative_location.append(keyword),
            self.absolute_location_of(&[keyword]),
        )
    }

    /// A passing schema-level composite node for this frame
    pub fn schema_result(&self) -> ValidationResult {
        ValidationResult::new(
            None,
            self.instance_location.clone(),
            self.relative_location.clone(),
            self.absolute_location_of(&[]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope() -> Rc<ValidationScope> {
        ValidationScope::new(ValidationOptions::default(), SchemaRegistry::global())
    }

    #[test]
    fn test_child_isolation_and_merge() {
        let instance = json!({"a": 1});
        let mut parent = ValidationContext::new(&instance, None, scope());

        let sub = json!(1);
        let mut child = parent.child(&sub, &["properties", "a"], Some("a".to_string()));
        child.mark_property_evaluated("a");
        child.mark_items_evaluated(3);

        // isolation until merged
        assert!(parent.evaluated_properties().is_empty());
        assert_eq!(parent.evaluated_items(), 0);

        parent.merge_child(&child);
        assert!(parent.evaluated_properties().contains("a"));
        assert_eq!(parent.evaluated_items(), 3);
    }

    #[test]
    fn test_merge_is_monotonic() {
        let instance = json!([]);
        let mut parent = ValidationContext::new(&instance, None, scope());
        parent.mark_items_evaluated(5);

        let child = parent.child(&instance, &["items"], None);
        parent.merge_child(&child);
        // an empty child cannot lower the watermark
        assert_eq!(parent.evaluated_items(), 5);
    }

    #[test]
    fn test_child_locations() {
        let instance = json!({"a": {"b": 1}});
        let parent = ValidationContext::new(&instance, None, scope());

        let sub = json!({"b": 1});
        let child = parent.child(&sub, &["properties", "a"], Some("a".to_string()));
        assert_eq!(child.instance_location.to_string(), "/a");
        assert_eq!(child.relative_location.to_string(), "/properties/a");
    }

    #[test]
    fn test_annotation_channel_not_inherited() {
        let instance = json!(1);
        let mut parent = ValidationContext::new(&instance, None, scope());
        parent.set_annotation(crate::annotations::keys::IF_KEYWORD_VALID, AnnotationValue::Bool(true));

        let child = parent.child(&instance, &["then"], None);
        assert!(child.annotation(crate::annotations::keys::IF_KEYWORD_VALID).is_none());
    }

    #[test]
    fn test_absolute_location() {
        let instance = json!(1);
        let base = Url::parse("http://example.com/schema").unwrap();
        let ctx = ValidationContext::new(&instance, Some(base), scope());

        assert_eq!(
            ctx.absolute_location_of(&["minimum"]),
            Some("http://example.com/schema#/minimum".to_string())
        );
    }

    #[test]
    fn test_cycle_guard() {
        let ctx_scope = scope();
        let location = JsonPointer::root();

        assert!(ctx_scope.enter_ref("http://x/s#", &location));
        assert!(!ctx_scope.enter_ref("http://x/s#", &location));
        ctx_scope.leave_ref("http://x/s#", &location);
        assert!(ctx_scope.enter_ref("http://x/s#", &location));
    }
}
