//! Core keywords: identifiers and references
//!
//! `$ref` resolution is late-bound: the target is looked up at evaluation
//! time through the local registry, the global registry, and finally the
//! download hook, which allows forward references and cyclic schemas. A
//! per-validation visited set keyed by (absolute URI, instance location)
//! terminates reference cycles.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use url::Url;

use crate::context::ValidationContext;
use crate::draft::DraftSet;
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::{sequence, Keyword, ParseContext, Vocabulary};
use crate::pointer::JsonPointer;
use crate::registry::LocalRegistry;
use crate::result::ValidationResult;
use crate::schema::core::anchor_key;
use crate::schema::SchemaDocument;

fn split_fragment(target: &str) -> (String, String) {
    match target.split_once('#') {
        Some((doc, fragment)) => (doc.to_string(), fragment.to_string()),
        None => (target.to_string(), String::new()),
    }
}

fn resolution_failure(result: ValidationResult, reference: &str, detail: &str) -> ValidationResult {
    result.info("reference", json!(reference)).fail_message(format!(
        "Reference '{}' could not be resolved: {}",
        reference, detail
    ))
}

/// Validate a resolved reference target in a child frame
///
/// The child crosses into the target document: its base URI, document root,
/// and schema-root-relative location all switch to the target's.
fn run_reference(
    ctx: &mut ValidationContext<'_>,
    keyword: &str,
    mut result: ValidationResult,
    visit_key: &str,
    document: Arc<SchemaDocument>,
    schema: Arc<SchemaDocument>,
    base_uri: Option<Url>,
    base_relative: Option<JsonPointer>,
) -> ValidationResult {
    if !ctx.scope().enter_ref(visit_key, &ctx.instance_location) {
        // a second visit of the same reference at the same instance
        // location is a cycle; report valid to terminate
        tracing::debug!(reference = visit_key, "reference cycle detected");
        return result;
    }

    let instance = ctx.instance;
    let mut child = ctx.child(instance, &[keyword], None);
    child.base_uri = base_uri;
    child.base_relative_location = base_relative;
    child.document = Some(document);

    let subresult = schema.validate_with(&mut child);
    ctx.scope().leave_ref(visit_key, &ctx.instance_location);

    if subresult.is_valid {
        ctx.merge_child(&child);
    } else {
        result = result.fail_message("Referenced schema does not match");
    }
    result.push(subresult);
    result
}

/// `$ref`: URI reference to another schema, resolved at evaluation time
#[derive(Debug)]
pub struct RefKeyword {
    reference: String,
}

impl Keyword for RefKeyword {
    fn name(&self) -> &str {
        "$ref"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Core
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::REFERENCES
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let result = ctx.keyword_result("$ref");

        let target = match &ctx.base_uri {
            Some(base) => match base.join(&self.reference) {
                Ok(joined) => joined.to_string(),
                Err(e) => return resolution_failure(result, &self.reference, &e.to_string()),
            },
            None => self.reference.clone(),
        };
        let (doc_uri, fragment) = split_fragment(&target);

        let document = if doc_uri.is_empty() {
            ctx.document()
        } else {
            match ctx.scope().resolve_document(&doc_uri) {
                Ok(found) => found,
                Err(e) => return resolution_failure(result, &self.reference, &e.to_string()),
            }
        };
        let Some(document) = document else {
            return resolution_failure(result, &self.reference, "target document not found");
        };

        let child_base = if doc_uri.is_empty() {
            ctx.base_uri.clone()
        } else {
            Url::parse(&doc_uri).ok()
        };

        let (schema, base_relative) = if fragment.is_empty() {
            (Arc::clone(&document), Some(JsonPointer::root()))
        } else if fragment.starts_with('/') {
            let pointer = match JsonPointer::parse(&fragment) {
                Ok(pointer) => pointer,
                Err(e) => return resolution_failure(result, &self.reference, &e.to_string()),
            };
            match document.resolve_pointer(pointer.segments()) {
                Some(sub) => (sub, Some(pointer)),
                None => {
                    return resolution_failure(
                        result,
                        &self.reference,
                        "no schema at the referenced pointer",
                    )
                }
            }
        } else {
            // plain-name fragment: an anchor in the target document
            let key = match child_base.as_ref() {
                Some(base) => anchor_key(Some(base), &fragment),
                None => anchor_key(None, &fragment),
            };
            match ctx.scope().local_get(&key) {
                Some(sub) => (sub, None),
                None => {
                    return resolution_failure(result, &self.reference, "anchor not found")
                }
            }
        };

        let visit_key = format!("{}#{}", doc_uri, fragment);
        run_reference(
            ctx,
            "$ref",
            result,
            &visit_key,
            document,
            schema,
            child_base,
            base_relative,
        )
    }

    fn to_json(&self) -> Value {
        json!(self.reference)
    }
}

pub(crate) fn parse_ref(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let reference = value
        .as_str()
        .ok_or_else(|| SchemaError::keyword("$ref", "expected a URI reference string"))?;
    Ok(Box::new(RefKeyword {
        reference: reference.to_string(),
    }))
}

/// `$recursiveRef`: reference to `#`, retargeted to the outermost dynamic
/// scope that declared `$recursiveAnchor: true`
#[derive(Debug)]
pub struct RecursiveRefKeyword;

impl Keyword for RecursiveRefKeyword {
    fn name(&self) -> &str {
        "$recursiveRef"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::DRAFT2019_09
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Core
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::REFERENCES
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let result = ctx.keyword_result("$recursiveRef");

        let (document, base_uri) = match ctx.recursive_anchor.clone() {
            Some(anchor) => (Some(anchor.document), anchor.base_uri),
            None => (ctx.document(), ctx.base_uri.clone()),
        };
        let Some(document) = document else {
            return resolution_failure(result, "#", "no enclosing document");
        };

        let visit_key = format!(
            "{}#$recursive",
            base_uri.as_ref().map(Url::as_str).unwrap_or("")
        );
        run_reference(
            ctx,
            "$recursiveRef",
            result,
            &visit_key,
            Arc::clone(&document),
            document,
            base_uri,
            Some(JsonPointer::root()),
        )
    }

    fn to_json(&self) -> Value {
        json!("#")
    }
}

pub(crate) fn parse_recursive_ref(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    match value.as_str() {
        Some("#") => Ok(Box::new(RecursiveRefKeyword)),
        _ => Err(SchemaError::keyword("$recursiveRef", "expected the string '#'")),
    }
}

/// `$recursiveAnchor`: marks a dynamic scope; the engine records the
/// outermost one while descending
#[derive(Debug)]
pub struct RecursiveAnchorKeyword {
    enabled: bool,
}

impl Keyword for RecursiveAnchorKeyword {
    fn name(&self) -> &str {
        "$recursiveAnchor"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::DRAFT2019_09
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Core
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::IDENTIFIERS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        ctx.keyword_result("$recursiveAnchor")
    }

    fn to_json(&self) -> Value {
        Value::Bool(self.enabled)
    }
}

pub(crate) fn parse_recursive_anchor(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let enabled = value
        .as_bool()
        .ok_or_else(|| SchemaError::keyword("$recursiveAnchor", "expected a boolean"))?;
    Ok(Box::new(RecursiveAnchorKeyword { enabled }))
}

/// `$id` / `id`: gives the schema a URI; resolution happens at parse time
#[derive(Debug)]
pub struct IdKeyword {
    name: &'static str,
    raw: String,
}

impl Keyword for IdKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Core
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::IDENTIFIERS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        ctx.keyword_result(self.name)
    }

    fn to_json(&self) -> Value {
        json!(self.raw)
    }
}

pub(crate) fn parse_id(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let raw = value
        .as_str()
        .ok_or_else(|| SchemaError::keyword("$id", "expected a URI string"))?;
    Ok(Box::new(IdKeyword {
        name: ctx.draft.id_keyword(),
        raw: raw.to_string(),
    }))
}

/// `$anchor`: plain-name identifier for reference targets
#[derive(Debug)]
pub struct AnchorKeyword {
    anchor: String,
}

impl Keyword for AnchorKeyword {
    fn name(&self) -> &str {
        "$anchor"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::DRAFT2019_09
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Core
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::IDENTIFIERS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        ctx.keyword_result("$anchor")
    }

    fn to_json(&self) -> Value {
        json!(self.anchor)
    }
}

pub(crate) fn parse_anchor(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let anchor = value
        .as_str()
        .ok_or_else(|| SchemaError::keyword("$anchor", "expected a string"))?;
    if anchor.is_empty() || anchor.starts_with('#') {
        return Err(SchemaError::keyword("$anchor", "expected a plain name"));
    }
    Ok(Box::new(AnchorKeyword {
        anchor: anchor.to_string(),
    }))
}

/// `$defs` / `definitions`: non-validating container exposing subschemas
/// for resolution
#[derive(Debug)]
pub struct DefsKeyword {
    name: &'static str,
    entries: Vec<(String, Arc<SchemaDocument>)>,
}

impl Keyword for DefsKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Core
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::IDENTIFIERS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        ctx.keyword_result(self.name)
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        for (_, schema) in &self.entries {
            schema.register_tree(base, registry);
        }
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        let (name, rest) = pointer.split_first()?;
        let (_, schema) = self.entries.iter().find(|(n, _)| n == name)?;
        schema.resolve_pointer(rest)
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, schema) in &self.entries {
            map.insert(name.clone(), schema.to_json());
        }
        Value::Object(map)
    }
}

fn parse_defs_entries(
    name: &'static str,
    value: &Value,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let map = value
        .as_object()
        .ok_or_else(|| SchemaError::keyword(name, "expected an object of schemas"))?;
    let entries = map
        .iter()
        .map(|(key, sub)| Ok((key.clone(), SchemaDocument::parse_nested(sub, ctx)?)))
        .collect::<SchemaResult<Vec<_>>>()?;
    Ok(Box::new(DefsKeyword { name, entries }))
}

pub(crate) fn parse_defs(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    parse_defs_entries("$defs", value, ctx)
}

pub(crate) fn parse_definitions(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    parse_defs_entries("definitions", value, ctx)
}
