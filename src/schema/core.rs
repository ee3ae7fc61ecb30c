//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Core schema document and evaluation driver
//!
//! A `SchemaDocument` is the composite parsed form of one schema object:
//! its keyword set in insertion order, its resolution metadata (`$id`,
//! `$anchor`, base URI), and the derived evaluation order. Boolean schemas
//! short-circuit. Evaluation drives keywords in `(evaluation_sequence,
//! insertion_order)` order so later keywords can read annotations written
//! by earlier ones.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::config::ValidationOptions;
use crate::context::{DynamicAnchor, ValidationContext};
use crate::draft::Draft;
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::{catalog, metadata::AnnotationKeyword, Keyword, ParseContext, Vocabulary};
use crate::output::OutputFormat;
use crate::pointer::JsonPointer;
use crate::registry::{LocalRegistry, SchemaRegistry};
use crate::result::ValidationResult;

/// Parsed form of one schema object
#[derive(Debug)]
pub struct SchemaDocument {
    /// Absolute URI under which the document was loaded, if any
    document_path: Option<Url>,

    /// Absolute `$id`, normalized against the parent base URI
    id: Option<Url>,

    /// Plain-name anchor (`$anchor`, or a fragment-only `$id`/`id`)
    anchor: Option<String>,

    /// `true` when the schema declares `$recursiveAnchor: true`
    recursive_anchor: bool,

    /// Set when the schema is literally `true` or `false`
    bool_form: Option<bool>,

    /// Declared `$schema`, if any
    metaschema_uri: Option<String>,

    /// Active draft for this document
    draft: Draft,

    /// `$vocabulary` map, present on meta-schemas
    vocabulary_map: Option<HashMap<String, bool>>,

    /// Vocabularies disabled by the document's meta-schema
    disabled_vocabularies: Vec<Vocabulary>,

    /// Keywords in insertion order
    keywords: Vec<Box<dyn Keyword>>,

    /// Indices into `keywords` in evaluation order
    order: Vec<usize>,

    /// Pre-2019-09: `$ref` suppresses its siblings
    ref_exclusive: bool,
}

impl SchemaDocument {
    /// Parse a root schema document
    pub fn parse_rooted(
        value: &Value,
        document_path: Option<Url>,
        options: &ValidationOptions,
    ) -> SchemaResult<Arc<SchemaDocument>> {
        Self::parse_rooted_with_registry(value, document_path, options, None)
    }

    /// Parse a root schema document, consulting a registry for the declared
    /// meta-schema's `$vocabulary` map
    pub fn parse_rooted_with_registry(
        value: &Value,
        document_path: Option<Url>,
        options: &ValidationOptions,
        registry: Option<&SchemaRegistry>,
    ) -> SchemaResult<Arc<SchemaDocument>> {
        match value {
            Value::Bool(b) => Ok(Arc::new(Self::trivial(*b, document_path, options.default_draft))),
            Value::Object(map) => {
                let metaschema_uri = map
                    .get("$schema")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let draft = metaschema_uri
                    .as_deref()
                    .and_then(Draft::from_metaschema_uri)
                    .unwrap_or(options.default_draft);

                let disabled = Self::disabled_vocabularies_for(
                    draft,
                    metaschema_uri.as_deref(),
                    registry,
                );

                let base = document_path.clone();
                let mut ctx = ParseContext::new(draft, base, options);
                ctx.disabled_vocabularies = disabled;

                Self::parse_object(map, &ctx, document_path, metaschema_uri)
            }
            other => Err(SchemaError::parse(format!(
                "schema must be an object or boolean, got {}",
                crate::utils::type_name_of(other)
            ))),
        }
    }

    /// Parse a subschema inside an enclosing document
    pub(crate) fn parse_nested(
        value: &Value,
        ctx: &ParseContext<'_>,
    ) -> SchemaResult<Arc<SchemaDocument>> {
        match value {
            Value::Bool(b) => Ok(Arc::new(Self::trivial(*b, None, ctx.draft))),
            Value::Object(map) => Self::parse_object(map, ctx, None, None),
            other => Err(SchemaError::parse(format!(
                "subschema must be an object or boolean, got {}",
                crate::utils::type_name_of(other)
            ))),
        }
    }

    fn trivial(allowed: bool, document_path: Option<Url>, draft: Draft) -> SchemaDocument {
        SchemaDocument {
            document_path,
            id: None,
            anchor: None,
            recursive_anchor: false,
            bool_form: Some(allowed),
            metaschema_uri: None,
            draft,
            vocabulary_map: None,
            disabled_vocabularies: Vec::new(),
            keywords: Vec::new(),
            order: Vec::new(),
            ref_exclusive: false,
        }
    }

    fn parse_object(
        map: &Map<String, Value>,
        parent_ctx: &ParseContext<'_>,
        document_path: Option<Url>,
        metaschema_uri: Option<String>,
    ) -> SchemaResult<Arc<SchemaDocument>> {
        let draft = parent_ctx.draft;

        // identifier resolution; a fragment-only id is a plain-name anchor
        let raw_id = map.get(draft.id_keyword()).and_then(Value::as_str);
        let mut id: Option<Url> = None;
        let mut anchor: Option<String> = None;
        if let Some(raw) = raw_id {
            if let Some(name) = raw.strip_prefix('#') {
                if !name.is_empty() {
                    anchor = Some(name.to_string());
                }
            } else {
                id = Some(resolve_reference(raw, parent_ctx.base_uri.as_ref())?);
            }
        }
        if draft == Draft::Draft201909 {
            if let Some(name) = map.get("$anchor").and_then(Value::as_str) {
                anchor = Some(name.to_string());
            }
        }

        let recursive_anchor = draft == Draft::Draft201909
            && map.get("$recursiveAnchor").and_then(Value::as_bool) == Some(true);

        let vocabulary_map = map.get("$vocabulary").and_then(Value::as_object).map(|m| {
            m.iter()
                .map(|(k, v)| (k.clone(), v.as_bool().unwrap_or(false)))
                .collect()
        });

        let base = id.clone().or_else(|| parent_ctx.base_uri.clone());
        let ctx = parent_ctx.nested(base);

        let mut keywords: Vec<Box<dyn Keyword>> = Vec::with_capacity(map.len());
        for (name, value) in map {
            if name == "$schema" {
                continue;
            }
            match catalog::lookup(name, draft) {
                Some(descriptor) => {
                    keywords.push((descriptor.parse)(value, map, &ctx)?);
                }
                None => {
                    // unknown keywords are preserved as annotations
                    keywords.push(Box::new(AnnotationKeyword::new(name.clone(), value.clone())));
                }
            }
        }

        let mut order: Vec<usize> = (0..keywords.len()).collect();
        order.sort_by_key(|&i| (keywords[i].evaluation_sequence(), i));

        let ref_exclusive = draft < Draft::Draft201909 && map.contains_key("$ref");

        Ok(Arc::new(SchemaDocument {
            document_path,
            id,
            anchor,
            recursive_anchor,
            bool_form: None,
            metaschema_uri,
            draft,
            vocabulary_map,
            disabled_vocabularies: parent_ctx.disabled_vocabularies.clone(),
            keywords,
            order,
            ref_exclusive,
        }))
    }

    fn disabled_vocabularies_for(
        draft: Draft,
        metaschema_uri: Option<&str>,
        registry: Option<&SchemaRegistry>,
    ) -> Vec<Vocabulary> {
        if draft != Draft::Draft201909 {
            return Vec::new();
        }
        let (Some(uri), Some(registry)) = (metaschema_uri, registry) else {
            return Vec::new();
        };
        let Some(metaschema) = registry.get(uri) else {
            return Vec::new();
        };
        let Some(declared) = &metaschema.vocabulary_map else {
            return Vec::new();
        };

        let enabled: Vec<Vocabulary> = declared
            .keys()
            .filter_map(|uri| Vocabulary::from_uri(uri))
            .collect();

        [
            Vocabulary::Applicator,
            Vocabulary::Validation,
            Vocabulary::Format,
            Vocabulary::Content,
            Vocabulary::MetaData,
        ]
        .into_iter()
        .filter(|v| !enabled.contains(v))
        .collect()
    }

    /// Absolute URI the document was loaded under
    pub fn document_path(&self) -> Option<&Url> {
        self.document_path.as_ref()
    }

    /// Absolute `$id`, if declared and resolvable
    pub fn id(&self) -> Option<&Url> {
        self.id.as_ref()
    }

    /// Plain-name anchor, if declared
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Trivial boolean form, if the schema is literally `true` or `false`
    pub fn bool_form(&self) -> Option<bool> {
        self.bool_form
    }

    /// Declared meta-schema URI
    pub fn metaschema_uri(&self) -> Option<&str> {
        self.metaschema_uri.as_deref()
    }

    /// Active draft
    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// `$vocabulary` declarations, present on meta-schemas
    pub fn vocabulary_map(&self) -> Option<&HashMap<String, bool>> {
        self.vocabulary_map.as_ref()
    }

    /// Keywords in insertion order
    pub fn keywords(&self) -> impl Iterator<Item = &dyn Keyword> {
        self.keywords.iter().map(|k| k.as_ref())
    }

    fn is_vocabulary_disabled(&self, vocabulary: Vocabulary) -> bool {
        vocabulary != Vocabulary::Core && self.disabled_vocabularies.contains(&vocabulary)
    }

    /// Evaluate this schema against the frame's instance
    ///
    /// Entering the document updates the frame's base URI for a declared
    /// `$id` and records the outermost `$recursiveAnchor` dynamic scope.
    pub fn validate_with(self: &Arc<Self>, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        if let Some(allowed) = self.bool_form {
            let result = ctx.schema_result();
            return if allowed {
                result
            } else {
                result.fail_message("False schema never matches")
            };
        }

        if let Some(id) = &self.id {
            ctx.base_uri = Some(id.clone());
            ctx.base_relative_location = Some(JsonPointer::root());
        }
        if self.recursive_anchor && ctx.recursive_anchor.is_none() {
            ctx.recursive_anchor = Some(DynamicAnchor {
                base_uri: ctx.base_uri.clone(),
                document: Arc::clone(self),
            });
        }

        let flag_mode = ctx.options().output_format == OutputFormat::Flag;
        let mut composite = ctx.schema_result();
        let mut valid = true;

        for &index in &self.order {
            let keyword = &self.keywords[index];
            if self.ref_exclusive && keyword.name() != "$ref" {
                continue;
            }
            if self.is_vocabulary_disabled(keyword.vocabulary()) {
                // a disabled vocabulary must not affect the verdict
                let node = ctx.keyword_result(keyword.name()).annotate(keyword.to_json());
                composite.push(node);
                continue;
            }

            let node = keyword.validate(ctx);
            if !node.is_valid {
                valid = false;
            }
            composite.push(node);

            if !valid && flag_mode {
                break;
            }
        }

        composite.is_valid = valid;
        composite
    }

    /// Bind this document's ids and anchors (and those of its subschemas)
    /// into a registry
    pub fn register_tree(self: &Arc<Self>, parent_base: Option<&Url>, registry: &mut LocalRegistry) {
        let base = self.id.clone().or_else(|| parent_base.cloned());

        if let Some(path) = &self.document_path {
            registry.register(path.as_str(), Arc::clone(self));
        }
        if let Some(id) = &self.id {
            registry.register(id.as_str(), Arc::clone(self));
        }
        if let Some(anchor) = &self.anchor {
            registry.register(anchor_key(base.as_ref(), anchor), Arc::clone(self));
        }

        for keyword in &self.keywords {
            keyword.register_subschemas(base.as_ref(), registry);
        }
    }

    /// Walk a JSON Pointer through the keyword tree
    pub fn resolve_pointer(self: &Arc<Self>, segments: &[String]) -> Option<Arc<SchemaDocument>> {
        if segments.is_empty() {
            return Some(Arc::clone(self));
        }
        let keyword = self.keywords.iter().find(|k| k.name() == segments[0])?;
        keyword.resolve_subschema(&segments[1..])
    }

    /// Serialize back to JSON
    ///
    /// Round-trips the parsed form up to keyword ordering.
    pub fn to_json(&self) -> Value {
        match self.bool_form {
            Some(b) => Value::Bool(b),
            None => {
                let mut map = Map::new();
                if let Some(uri) = &self.metaschema_uri {
                    map.insert("$schema".to_string(), Value::String(uri.clone()));
                }
                for keyword in &self.keywords {
                    map.insert(keyword.name().to_string(), keyword.to_json());
                }
                Value::Object(map)
            }
        }
    }

    /// Structural equality of two parsed documents
    pub fn structural_eq(&self, other: &SchemaDocument) -> bool {
        self.to_json() == other.to_json()
    }
}

/// Resolve a reference string against an optional base URI
pub(crate) fn resolve_reference(reference: &str, base: Option<&Url>) -> SchemaResult<Url> {
    match base {
        Some(base) => Ok(base.join(reference)?),
        None => Ok(Url::parse(reference)?),
    }
}

/// Registry key for a plain-name anchor
pub(crate) fn anchor_key(base: Option<&Url>, anchor: &str) -> String {
    match base {
        Some(base) => format!("{}#{}", base.as_str().trim_end_matches('#'), anchor),
        None => format!("#{}", anchor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> ValidationOptions {
        ValidationOptions::default()
    }

    #[test]
    fn test_boolean_schema_forms() {
        let doc = SchemaDocument::parse_rooted(&json!(true), None, &options()).unwrap();
        assert_eq!(doc.bool_form(), Some(true));

        let doc = SchemaDocument::parse_rooted(&json!(false), None, &options()).unwrap();
        assert_eq!(doc.bool_form(), Some(false));
    }

    #[test]
    fn test_rejects_non_schema_values() {
        assert!(SchemaDocument::parse_rooted(&json!(42), None, &options()).is_err());
        assert!(SchemaDocument::parse_rooted(&json!("x"), None, &options()).is_err());
    }

    #[test]
    fn test_draft_detection_from_metaschema() {
        let doc = SchemaDocument::parse_rooted(
            &json!({"$schema": "http://json-schema.org/draft-07/schema#"}),
            None,
            &options(),
        )
        .unwrap();
        assert_eq!(doc.draft(), Draft::Draft7);

        let doc = SchemaDocument::parse_rooted(&json!({}), None, &options()).unwrap();
        assert_eq!(doc.draft(), Draft::Draft201909);
    }

    #[test]
    fn test_unknown_keywords_preserved() {
        let doc = SchemaDocument::parse_rooted(
            &json!({"x-custom": {"arbitrary": true}, "type": "string"}),
            None,
            &options(),
        )
        .unwrap();

        let names: Vec<&str> = doc.keywords().map(|k| k.name()).collect();
        assert!(names.contains(&"x-custom"));
        assert!(names.contains(&"type"));
    }

    #[test]
    fn test_id_resolution_against_base() {
        let doc = SchemaDocument::parse_rooted(
            &json!({"$id": "http://example.com/root"}),
            None,
            &options(),
        )
        .unwrap();
        assert_eq!(doc.id().unwrap().as_str(), "http://example.com/root");
    }

    #[test]
    fn test_fragment_only_id_becomes_anchor() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$id": "#local"
        });
        let doc = SchemaDocument::parse_rooted(&schema, None, &options()).unwrap();
        assert!(doc.id().is_none());
        assert_eq!(doc.anchor(), Some("local"));
    }

    #[test]
    fn test_to_json_roundtrip() {
        let schema = json!({
            "type": "object",
            "required": ["a"],
            "properties": {"a": {"type": "string"}},
            "x-unknown": [1, 2]
        });
        let doc = SchemaDocument::parse_rooted(&schema, None, &options()).unwrap();
        assert_eq!(doc.to_json(), schema);
    }

    #[test]
    fn test_keyword_order_places_unevaluated_last() {
        let schema = json!({
            "unevaluatedProperties": false,
            "properties": {"a": true},
            "type": "object"
        });
        let doc = SchemaDocument::parse_rooted(&schema, None, &options()).unwrap();

        let ordered: Vec<&str> = doc
            .order
            .iter()
            .map(|&i| doc.keywords[i].name())
            .collect();
        assert_eq!(ordered, vec!["type", "properties", "unevaluatedProperties"]);
    }
}
