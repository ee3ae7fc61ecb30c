//! Applicator keywords
//!
//! Keywords whose value is or contains subschemas. Each branch evaluates in
//! a mutation-isolated child frame; only successful branches merge their
//! evaluation marks back, which is what `unevaluatedProperties` and
//! `unevaluatedItems` later consume.

use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use url::Url;

use crate::annotations::{keys, AnnotationValue};
use crate::context::ValidationContext;
use crate::draft::{Draft, DraftSet};
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::{sequence, Keyword, ParseContext, Vocabulary};
use crate::registry::LocalRegistry;
use crate::result::ValidationResult;
use crate::schema::SchemaDocument;

/// Evaluation marks carried out of a child frame
struct ChildOutcome {
    result: ValidationResult,
    properties: BTreeSet<String>,
    items: usize,
}

/// Run a subschema in a child frame derived from `ctx`
fn evaluate_child(
    ctx: &ValidationContext<'_>,
    schema: &Arc<SchemaDocument>,
    instance: &Value,
    keyword_path: &[&str],
    instance_segment: Option<String>,
) -> ChildOutcome {
    let mut child = ctx.child(instance, keyword_path, instance_segment);
    let result = schema.validate_with(&mut child);
    ChildOutcome {
        properties: child.evaluated_properties().clone(),
        items: child.evaluated_items(),
        result,
    }
}

/// Merge a successful child's marks into the parent frame
fn absorb(ctx: &mut ValidationContext<'_>, outcome: &ChildOutcome) {
    for property in &outcome.properties {
        ctx.mark_property_evaluated(property);
    }
    ctx.mark_items_evaluated(outcome.items);
}

/// Strip nested errors from a failing branch when the reporting policy
/// asks for it
fn apply_child_error_policy(ctx: &ValidationContext<'_>, keyword: &str, node: &mut ValidationResult) {
    if !node.is_valid && !ctx.options().should_report_child_errors(keyword, &ctx.instance_location) {
        node.nested.clear();
    }
}

// ---------------------------------------------------------------------------
// object applicators

/// `properties`: named subschemas applied to matching members
#[derive(Debug)]
pub struct PropertiesKeyword {
    properties: Vec<(String, Arc<SchemaDocument>)>,
}

impl Keyword for PropertiesKeyword {
    fn name(&self) -> &str {
        "properties"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let mut result = ctx.keyword_result("properties");
        let Some(object) = instance.as_object() else {
            return result;
        };

        let mut matched = BTreeSet::new();
        let mut valid = true;
        for (name, schema) in &self.properties {
            let Some(value) = object.get(name) else {
                continue;
            };
            matched.insert(name.clone());

            let outcome =
                evaluate_child(ctx, schema, value, &["properties", name.as_str()], Some(name.clone()));
            if outcome.result.is_valid {
                absorb(ctx, &outcome);
                ctx.mark_property_evaluated(name);
            } else {
                valid = false;
            }
            result.push(outcome.result);
        }

        ctx.set_annotation(keys::PROPERTIES_MATCHED, AnnotationValue::Keys(matched));
        if !valid {
            result = result.fail_message("Object properties do not match their schemas");
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        for (_, schema) in &self.properties {
            schema.register_tree(base, registry);
        }
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        let (name, rest) = pointer.split_first()?;
        let (_, schema) = self.properties.iter().find(|(n, _)| n == name)?;
        schema.resolve_pointer(rest)
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, schema) in &self.properties {
            map.insert(name.clone(), schema.to_json());
        }
        Value::Object(map)
    }
}

pub(crate) fn parse_properties(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let entries = value
        .as_object()
        .ok_or_else(|| SchemaError::keyword("properties", "expected an object"))?;
    let properties = entries
        .iter()
        .map(|(name, sub)| Ok((name.clone(), SchemaDocument::parse_nested(sub, ctx)?)))
        .collect::<SchemaResult<Vec<_>>>()?;
    Ok(Box::new(PropertiesKeyword { properties }))
}

/// `patternProperties`: regex-keyed subschemas
#[derive(Debug)]
pub struct PatternPropertiesKeyword {
    patterns: Vec<(String, regex::Regex, Arc<SchemaDocument>)>,
}

impl Keyword for PatternPropertiesKeyword {
    fn name(&self) -> &str {
        "patternProperties"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let mut result = ctx.keyword_result("patternProperties");
        let Some(object) = instance.as_object() else {
            return result;
        };

        let mut matched = BTreeSet::new();
        let mut valid = true;
        for (source, regex, schema) in &self.patterns {
            for (key, value) in object {
                if !regex.is_match(key) {
                    continue;
                }
                matched.insert(key.clone());

                let outcome = evaluate_child(
                    ctx,
                    schema,
                    value,
                    &["patternProperties", source.as_str()],
                    Some(key.clone()),
                );
                if outcome.result.is_valid {
                    absorb(ctx, &outcome);
                    ctx.mark_property_evaluated(key);
                } else {
                    valid = false;
                }
                result.push(outcome.result);
            }
        }

        ctx.set_annotation(keys::PATTERN_PROPERTIES_MATCHED, AnnotationValue::Keys(matched));
        if !valid {
            result = result.fail_message("Object properties do not match their pattern schemas");
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        for (_, _, schema) in &self.patterns {
            schema.register_tree(base, registry);
        }
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        let (source, rest) = pointer.split_first()?;
        let (_, _, schema) = self.patterns.iter().find(|(s, _, _)| s == source)?;
        schema.resolve_pointer(rest)
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (source, _, schema) in &self.patterns {
            map.insert(source.clone(), schema.to_json());
        }
        Value::Object(map)
    }
}

pub(crate) fn parse_pattern_properties(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let entries = value
        .as_object()
        .ok_or_else(|| SchemaError::keyword("patternProperties", "expected an object"))?;
    let patterns = entries
        .iter()
        .map(|(source, sub)| {
            Ok((
                source.clone(),
                regex::Regex::new(source)?,
                SchemaDocument::parse_nested(sub, ctx)?,
            ))
        })
        .collect::<SchemaResult<Vec<_>>>()?;
    Ok(Box::new(PatternPropertiesKeyword { patterns }))
}

/// `additionalProperties`: applied to members not covered by `properties`
/// or `patternProperties`
#[derive(Debug)]
pub struct AdditionalPropertiesKeyword {
    schema: Arc<SchemaDocument>,
}

impl Keyword for AdditionalPropertiesKeyword {
    fn name(&self) -> &str {
        "additionalProperties"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::GATED
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let mut covered: BTreeSet<String> = BTreeSet::new();
        for key in [keys::PROPERTIES_MATCHED, keys::PATTERN_PROPERTIES_MATCHED] {
            if let Some(names) = ctx.annotation(key).and_then(|a| a.as_keys()) {
                covered.extend(names.iter().cloned());
            }
        }

        let mut result = ctx.keyword_result("additionalProperties");
        let Some(object) = instance.as_object() else {
            return result;
        };

        let mut valid = true;
        for (key, value) in object {
            if covered.contains(key) {
                continue;
            }
            let outcome = evaluate_child(
                ctx,
                &self.schema,
                value,
                &["additionalProperties"],
                Some(key.clone()),
            );
            if outcome.result.is_valid {
                absorb(ctx, &outcome);
                ctx.mark_property_evaluated(key);
            } else {
                valid = false;
            }
            result.push(outcome.result);
        }

        if !valid {
            result = result.fail_message("Additional properties do not match the schema");
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        self.schema.register_tree(base, registry);
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        self.schema.resolve_pointer(pointer)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

pub(crate) fn parse_additional_properties(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(AdditionalPropertiesKeyword {
        schema: SchemaDocument::parse_nested(value, ctx)?,
    }))
}

/// `propertyNames`: schema applied to each key as a string instance
#[derive(Debug)]
pub struct PropertyNamesKeyword {
    schema: Arc<SchemaDocument>,
}

impl Keyword for PropertyNamesKeyword {
    fn name(&self) -> &str {
        "propertyNames"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::FROM_DRAFT6
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let mut result = ctx.keyword_result("propertyNames");
        let Some(object) = instance.as_object() else {
            return result;
        };

        let mut valid = true;
        for key in object.keys() {
            let name_instance = Value::String(key.clone());
            let outcome = evaluate_child(ctx, &self.schema, &name_instance, &["propertyNames"], None);
            if !outcome.result.is_valid {
                valid = false;
                result.push(outcome.result);
            }
        }

        if !valid {
            result = result.fail_message("Property names do not match the schema");
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        self.schema.register_tree(base, registry);
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        self.schema.resolve_pointer(pointer)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

pub(crate) fn parse_property_names(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(PropertyNamesKeyword {
        schema: SchemaDocument::parse_nested(value, ctx)?,
    }))
}

// ---------------------------------------------------------------------------
// array applicators

#[derive(Debug)]
enum ItemsForm {
    /// One schema applied to every element
    Single(Arc<SchemaDocument>),

    /// Positional schemas applied to the prefix
    Tuple(Vec<Arc<SchemaDocument>>),
}

/// `items`: schema applied to each element, or tuple form
#[derive(Debug)]
pub struct ItemsKeyword {
    form: ItemsForm,
}

impl Keyword for ItemsKeyword {
    fn name(&self) -> &str {
        "items"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let mut result = ctx.keyword_result("items");
        let Some(items) = instance.as_array() else {
            return result;
        };

        let mut valid = true;
        match &self.form {
            ItemsForm::Single(schema) => {
                ctx.set_annotation(keys::ITEMS_APPLIED_TO_ALL, AnnotationValue::Bool(true));
                for (index, item) in items.iter().enumerate() {
                    let segment = index.to_string();
                    let outcome = evaluate_child(ctx, schema, item, &["items"], Some(segment));
                    if outcome.result.is_valid {
                        absorb(ctx, &outcome);
                    } else {
                        valid = false;
                    }
                    result.push(outcome.result);
                }
                if valid {
                    ctx.mark_items_evaluated(items.len());
                }
            }
            ItemsForm::Tuple(schemas) => {
                let prefix = schemas.len().min(items.len());
                ctx.set_annotation(keys::ITEMS_APPLIED, AnnotationValue::Count(schemas.len()));
                for (index, (schema, item)) in schemas.iter().zip(items.iter()).enumerate() {
                    let position = index.to_string();
                    let outcome = evaluate_child(
                        ctx,
                        schema,
                        item,
                        &["items", position.as_str()],
                        Some(position.clone()),
                    );
                    if outcome.result.is_valid {
                        absorb(ctx, &outcome);
                    } else {
                        valid = false;
                    }
                    result.push(outcome.result);
                }
                if valid {
                    ctx.mark_items_evaluated(prefix);
                }
            }
        }

        if !valid {
            result = result.fail_message("Array items do not match their schemas");
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        match &self.form {
            ItemsForm::Single(schema) => schema.register_tree(base, registry),
            ItemsForm::Tuple(schemas) => {
                for schema in schemas {
                    schema.register_tree(base, registry);
                }
            }
        }
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        match &self.form {
            ItemsForm::Single(schema) => schema.resolve_pointer(pointer),
            ItemsForm::Tuple(schemas) => {
                let (index, rest) = pointer.split_first()?;
                let index: usize = index.parse().ok()?;
                schemas.get(index)?.resolve_pointer(rest)
            }
        }
    }

    fn to_json(&self) -> Value {
        match &self.form {
            ItemsForm::Single(schema) => schema.to_json(),
            ItemsForm::Tuple(schemas) => {
                Value::Array(schemas.iter().map(|s| s.to_json()).collect())
            }
        }
    }
}

pub(crate) fn parse_items(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let form = match value {
        Value::Array(entries) => ItemsForm::Tuple(
            entries
                .iter()
                .map(|sub| SchemaDocument::parse_nested(sub, ctx))
                .collect::<SchemaResult<Vec<_>>>()?,
        ),
        other => ItemsForm::Single(SchemaDocument::parse_nested(other, ctx)?),
    };
    Ok(Box::new(ItemsKeyword { form }))
}

/// `additionalItems`: applied to elements past the tuple prefix
#[derive(Debug)]
pub struct AdditionalItemsKeyword {
    schema: Arc<SchemaDocument>,
}

impl Keyword for AdditionalItemsKeyword {
    fn name(&self) -> &str {
        "additionalItems"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::GATED
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        // only meaningful after the tuple form of `items`
        if ctx
            .annotation(keys::ITEMS_APPLIED_TO_ALL)
            .and_then(|a| a.as_bool())
            == Some(true)
        {
            return ctx.keyword_result("additionalItems");
        }
        let prefix = ctx.annotation(keys::ITEMS_APPLIED).and_then(|a| a.as_count());

        let instance = ctx.instance;
        let mut result = ctx.keyword_result("additionalItems");
        let (Some(prefix), Some(items)) = (prefix, instance.as_array()) else {
            return result;
        };

        let mut valid = true;
        for (index, item) in items.iter().enumerate().skip(prefix) {
            let segment = index.to_string();
            let outcome = evaluate_child(ctx, &self.schema, item, &["additionalItems"], Some(segment));
            if outcome.result.is_valid {
                absorb(ctx, &outcome);
            } else {
                valid = false;
            }
            result.push(outcome.result);
        }

        if valid {
            ctx.mark_items_evaluated(items.len());
        } else {
            result = result.fail_message("Additional items do not match the schema");
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        self.schema.register_tree(base, registry);
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        self.schema.resolve_pointer(pointer)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

pub(crate) fn parse_additional_items(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(AdditionalItemsKeyword {
        schema: SchemaDocument::parse_nested(value, ctx)?,
    }))
}

/// `contains`: at least one element matches, unless sibling bounds take over
///
/// Publishes its match count; `minContains: 0` downgrades the default
/// at-least-one requirement through the sibling bounds.
#[derive(Debug)]
pub struct ContainsKeyword {
    schema: Arc<SchemaDocument>,
    bounded: bool,
}

impl Keyword for ContainsKeyword {
    fn name(&self) -> &str {
        "contains"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::FROM_DRAFT6
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let mut result = ctx.keyword_result("contains");
        let Some(items) = instance.as_array() else {
            return result;
        };

        let mut count = 0usize;
        let mut matches = Vec::new();
        let mut misses = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let segment = index.to_string();
            let outcome = evaluate_child(ctx, &self.schema, item, &["contains"], Some(segment));
            if outcome.result.is_valid {
                count += 1;
                absorb(ctx, &outcome);
                ctx.mark_items_evaluated(index + 1);
                matches.push(outcome.result);
            } else {
                misses.push(outcome.result);
            }
        }

        ctx.set_annotation(keys::CONTAINS_COUNT, AnnotationValue::Count(count));

        if self.bounded || count >= 1 {
            result.nested = matches;
            result.annotation = Some(json!(count));
            result
        } else {
            result.nested = misses;
            result.fail_message("No array item matches the contains schema")
        }
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        self.schema.register_tree(base, registry);
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        self.schema.resolve_pointer(pointer)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

pub(crate) fn parse_contains(
    value: &Value,
    raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let bounded = ctx.draft == Draft::Draft201909
        && (raw.contains_key("minContains") || raw.contains_key("maxContains"));
    Ok(Box::new(ContainsKeyword {
        schema: SchemaDocument::parse_nested(value, ctx)?,
        bounded,
    }))
}

/// `unevaluatedItems`: applied past the evaluated-items watermark
#[derive(Debug)]
pub struct UnevaluatedItemsKeyword {
    schema: Arc<SchemaDocument>,
}

impl Keyword for UnevaluatedItemsKeyword {
    fn name(&self) -> &str {
        "unevaluatedItems"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::DRAFT2019_09
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::UNEVALUATED
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let start = ctx.evaluated_items();
        let mut result = ctx.keyword_result("unevaluatedItems");
        let Some(items) = instance.as_array() else {
            return result;
        };

        let mut valid = true;
        for (index, item) in items.iter().enumerate().skip(start) {
            let segment = index.to_string();
            let outcome = evaluate_child(ctx, &self.schema, item, &["unevaluatedItems"], Some(segment));
            if outcome.result.is_valid {
                absorb(ctx, &outcome);
            } else {
                valid = false;
            }
            result.push(outcome.result);
        }

        if valid {
            ctx.mark_items_evaluated(items.len());
        } else {
            result = result.fail_message("Unevaluated items do not match the schema");
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        self.schema.register_tree(base, registry);
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        self.schema.resolve_pointer(pointer)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

pub(crate) fn parse_unevaluated_items(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(UnevaluatedItemsKeyword {
        schema: SchemaDocument::parse_nested(value, ctx)?,
    }))
}

/// `unevaluatedProperties`: applied to members no applicator covered
#[derive(Debug)]
pub struct UnevaluatedPropertiesKeyword {
    schema: Arc<SchemaDocument>,
}

impl Keyword for UnevaluatedPropertiesKeyword {
    fn name(&self) -> &str {
        "unevaluatedProperties"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::DRAFT2019_09
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::UNEVALUATED
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let evaluated = ctx.evaluated_properties().clone();
        let mut result = ctx.keyword_result("unevaluatedProperties");
        let Some(object) = instance.as_object() else {
            return result;
        };

        let mut valid = true;
        for (key, value) in object {
            if evaluated.contains(key) {
                continue;
            }
            let outcome = evaluate_child(
                ctx,
                &self.schema,
                value,
                &["unevaluatedProperties"],
                Some(key.clone()),
            );
            if outcome.result.is_valid {
                absorb(ctx, &outcome);
                ctx.mark_property_evaluated(key);
            } else {
                valid = false;
            }
            result.push(outcome.result);
        }

        if !valid {
            result = result.fail_message("Unevaluated properties do not match the schema");
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        self.schema.register_tree(base, registry);
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        self.schema.resolve_pointer(pointer)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

pub(crate) fn parse_unevaluated_properties(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(UnevaluatedPropertiesKeyword {
        schema: SchemaDocument::parse_nested(value, ctx)?,
    }))
}

// ---------------------------------------------------------------------------
// logic combinators

/// Shared shape of `allOf`, `anyOf`, and `oneOf`
#[derive(Debug)]
pub struct CombinatorKeyword {
    name: &'static str,
    schemas: Vec<Arc<SchemaDocument>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CombinatorKind {
    All,
    Any,
    One,
}

impl CombinatorKeyword {
    fn kind(&self) -> CombinatorKind {
        match self.name {
            "allOf" => CombinatorKind::All,
            "anyOf" => CombinatorKind::Any,
            _ => CombinatorKind::One,
        }
    }
}

impl Keyword for CombinatorKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let flag_mode = ctx.options().output_format == crate::output::OutputFormat::Flag;
        let kind = self.kind();

        let mut outcomes: Vec<ChildOutcome> = Vec::with_capacity(self.schemas.len());
        for (index, schema) in self.schemas.iter().enumerate() {
            let position = index.to_string();
            let outcome = evaluate_child(ctx, schema, instance, &[self.name, position.as_str()], None);
            let succeeded = outcome.result.is_valid;
            outcomes.push(outcome);

            // anyOf may stop at the first success when only the verdict is
            // being reported
            if kind == CombinatorKind::Any && succeeded && flag_mode {
                break;
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.result.is_valid).count();

        let valid = match kind {
            CombinatorKind::All => succeeded == outcomes.len(),
            CombinatorKind::Any => succeeded >= 1,
            CombinatorKind::One => succeeded == 1,
        };

        if valid {
            match kind {
                CombinatorKind::One => {
                    if let Some(outcome) = outcomes.iter().find(|o| o.result.is_valid) {
                        absorb(ctx, outcome);
                    }
                }
                _ => {
                    for outcome in outcomes.iter().filter(|o| o.result.is_valid) {
                        absorb(ctx, outcome);
                    }
                }
            }
        }

        let mut result = ctx.keyword_result(self.name);
        result.nested = outcomes.into_iter().map(|o| o.result).collect();
        if !valid {
            let message = match kind {
                CombinatorKind::All => "Not all subschemas matched",
                CombinatorKind::Any => "No subschema matched",
                CombinatorKind::One => {
                    if succeeded == 0 {
                        "No subschema matched"
                    } else {
                        "More than one subschema matched"
                    }
                }
            };
            result = result.info("matched", json!(succeeded)).fail_message(message);
            apply_child_error_policy(ctx, self.name, &mut result);
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        for schema in &self.schemas {
            schema.register_tree(base, registry);
        }
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        let (index, rest) = pointer.split_first()?;
        let index: usize = index.parse().ok()?;
        self.schemas.get(index)?.resolve_pointer(rest)
    }

    fn to_json(&self) -> Value {
        Value::Array(self.schemas.iter().map(|s| s.to_json()).collect())
    }
}

fn parse_combinator(
    name: &'static str,
    value: &Value,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let entries = value
        .as_array()
        .ok_or_else(|| SchemaError::keyword(name, "expected an array of schemas"))?;
    if entries.is_empty() {
        return Err(SchemaError::keyword(name, "expected a non-empty array"));
    }
    let schemas = entries
        .iter()
        .map(|sub| SchemaDocument::parse_nested(sub, ctx))
        .collect::<SchemaResult<Vec<_>>>()?;
    Ok(Box::new(CombinatorKeyword { name, schemas }))
}

pub(crate) fn parse_all_of(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    parse_combinator("allOf", value, ctx)
}

pub(crate) fn parse_any_of(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    parse_combinator("anyOf", value, ctx)
}

pub(crate) fn parse_one_of(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    parse_combinator("oneOf", value, ctx)
}

/// `not`: inverts its subschema; annotations are always discarded
#[derive(Debug)]
pub struct NotKeyword {
    schema: Arc<SchemaDocument>,
}

impl Keyword for NotKeyword {
    fn name(&self) -> &str {
        "not"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let outcome = evaluate_child(ctx, &self.schema, instance, &["not"], None);

        let mut result = ctx.keyword_result("not");
        if outcome.result.is_valid {
            result = result.fail_message("Instance must not match the schema");
            apply_child_error_policy(ctx, "not", &mut result);
        } else {
            result.push(outcome.result);
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        self.schema.register_tree(base, registry);
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        self.schema.resolve_pointer(pointer)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

pub(crate) fn parse_not(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(NotKeyword {
        schema: SchemaDocument::parse_nested(value, ctx)?,
    }))
}

// ---------------------------------------------------------------------------
// conditionals

/// `if`: evaluates its subschema and records the verdict for `then`/`else`;
/// always reports valid
#[derive(Debug)]
pub struct IfKeyword {
    schema: Arc<SchemaDocument>,
}

impl Keyword for IfKeyword {
    fn name(&self) -> &str {
        "if"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::FROM_DRAFT7
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let outcome = evaluate_child(ctx, &self.schema, instance, &["if"], None);

        ctx.set_annotation(
            keys::IF_KEYWORD_VALID,
            AnnotationValue::Bool(outcome.result.is_valid),
        );
        if outcome.result.is_valid {
            absorb(ctx, &outcome);
        }

        let mut result = ctx.keyword_result("if");
        result.annotation = Some(json!(outcome.result.is_valid));
        if outcome.result.is_valid {
            result.push(outcome.result);
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        self.schema.register_tree(base, registry);
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        self.schema.resolve_pointer(pointer)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

pub(crate) fn parse_if(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(IfKeyword {
        schema: SchemaDocument::parse_nested(value, ctx)?,
    }))
}

/// `then` / `else`: run iff `if` recorded the matching verdict
#[derive(Debug)]
pub struct ConditionalBranchKeyword {
    name: &'static str,
    runs_when: bool,
    schema: Arc<SchemaDocument>,
}

impl Keyword for ConditionalBranchKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::FROM_DRAFT7
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::GATED
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let verdict = ctx
            .annotation(keys::IF_KEYWORD_VALID)
            .and_then(|a| a.as_bool());
        // without an `if` verdict the branch is not applicable
        if verdict != Some(self.runs_when) {
            return ctx.keyword_result(self.name);
        }

        let instance = ctx.instance;
        let outcome = evaluate_child(ctx, &self.schema, instance, &[self.name], None);

        let mut result = ctx.keyword_result(self.name);
        if outcome.result.is_valid {
            absorb(ctx, &outcome);
            result.push(outcome.result);
        } else {
            result.push(outcome.result);
            result = result.fail_message(match self.name {
                "then" => "Instance does not match the then schema",
                _ => "Instance does not match the else schema",
            });
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        self.schema.register_tree(base, registry);
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        self.schema.resolve_pointer(pointer)
    }

    fn to_json(&self) -> Value {
        self.schema.to_json()
    }
}

pub(crate) fn parse_then(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(ConditionalBranchKeyword {
        name: "then",
        runs_when: true,
        schema: SchemaDocument::parse_nested(value, ctx)?,
    }))
}

pub(crate) fn parse_else(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(ConditionalBranchKeyword {
        name: "else",
        runs_when: false,
        schema: SchemaDocument::parse_nested(value, ctx)?,
    }))
}

// ---------------------------------------------------------------------------
// dependencies

#[derive(Debug)]
enum DependencyEntry {
    /// Keys required when the trigger key is present
    Keys(Vec<String>),

    /// Schema applied to the whole object when the trigger key is present
    Schema(Arc<SchemaDocument>),
}

/// `dependencies` (drafts through 07): mixed key-list and schema forms
#[derive(Debug)]
pub struct DependenciesKeyword {
    entries: Vec<(String, DependencyEntry)>,
}

impl Keyword for DependenciesKeyword {
    fn name(&self) -> &str {
        "dependencies"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::THROUGH_DRAFT7
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let mut result = ctx.keyword_result("dependencies");
        let Some(object) = instance.as_object() else {
            return result;
        };

        let mut valid = true;
        for (trigger, entry) in &self.entries {
            if !object.contains_key(trigger) {
                continue;
            }
            match entry {
                DependencyEntry::Keys(required) => {
                    let missing: Vec<&String> = required
                        .iter()
                        .filter(|p| !object.contains_key(p.as_str()))
                        .collect();
                    if !missing.is_empty() {
                        valid = false;
                        result = result
                            .info("property", json!(trigger))
                            .info("missing", json!(missing));
                    }
                }
                DependencyEntry::Schema(schema) => {
                    let outcome =
                        evaluate_child(ctx, schema, instance, &["dependencies", trigger.as_str()], None);
                    if outcome.result.is_valid {
                        absorb(ctx, &outcome);
                    } else {
                        valid = false;
                        result = result.info("property", json!(trigger));
                    }
                    result.push(outcome.result);
                }
            }
        }

        if !valid {
            result = result.fail("Property {{property}} has unsatisfied dependencies");
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        for (_, entry) in &self.entries {
            if let DependencyEntry::Schema(schema) = entry {
                schema.register_tree(base, registry);
            }
        }
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        let (name, rest) = pointer.split_first()?;
        self.entries.iter().find_map(|(trigger, entry)| {
            if trigger != name {
                return None;
            }
            match entry {
                DependencyEntry::Schema(schema) => schema.resolve_pointer(rest),
                DependencyEntry::Keys(_) => None,
            }
        })
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (trigger, entry) in &self.entries {
            let value = match entry {
                DependencyEntry::Keys(required) => json!(required),
                DependencyEntry::Schema(schema) => schema.to_json(),
            };
            map.insert(trigger.clone(), value);
        }
        Value::Object(map)
    }
}

pub(crate) fn parse_dependencies(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let map = value
        .as_object()
        .ok_or_else(|| SchemaError::keyword("dependencies", "expected an object"))?;

    let entries = map
        .iter()
        .map(|(trigger, entry)| {
            let parsed = match entry {
                Value::Array(required) => DependencyEntry::Keys(
                    required
                        .iter()
                        .map(|r| {
                            r.as_str().map(str::to_string).ok_or_else(|| {
                                SchemaError::keyword("dependencies", "expected an array of strings")
                            })
                        })
                        .collect::<SchemaResult<Vec<_>>>()?,
                ),
                other => DependencyEntry::Schema(SchemaDocument::parse_nested(other, ctx)?),
            };
            Ok((trigger.clone(), parsed))
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(Box::new(DependenciesKeyword { entries }))
}

/// `dependentSchemas` (2019-09): schema form of `dependencies`
#[derive(Debug)]
pub struct DependentSchemasKeyword {
    entries: Vec<(String, Arc<SchemaDocument>)>,
}

impl Keyword for DependentSchemasKeyword {
    fn name(&self) -> &str {
        "dependentSchemas"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::DRAFT2019_09
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Applicator
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::APPLICATORS
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let mut result = ctx.keyword_result("dependentSchemas");
        let Some(object) = instance.as_object() else {
            return result;
        };

        let mut valid = true;
        for (trigger, schema) in &self.entries {
            if !object.contains_key(trigger) {
                continue;
            }
            let outcome =
                evaluate_child(ctx, schema, instance, &["dependentSchemas", trigger.as_str()], None);
            if outcome.result.is_valid {
                absorb(ctx, &outcome);
            } else {
                valid = false;
                result = result.info("property", json!(trigger));
            }
            result.push(outcome.result);
        }

        if !valid {
            result = result.fail("Schema dependency of property {{property}} is not satisfied");
        }
        result
    }

    fn register_subschemas(&self, base: Option<&Url>, registry: &mut LocalRegistry) {
        for (_, schema) in &self.entries {
            schema.register_tree(base, registry);
        }
    }

    fn resolve_subschema(&self, pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        let (name, rest) = pointer.split_first()?;
        let (_, schema) = self.entries.iter().find(|(trigger, _)| trigger == name)?;
        schema.resolve_pointer(rest)
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (trigger, schema) in &self.entries {
            map.insert(trigger.clone(), schema.to_json());
        }
        Value::Object(map)
    }
}

pub(crate) fn parse_dependent_schemas(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let map = value
        .as_object()
        .ok_or_else(|| SchemaError::keyword("dependentSchemas", "expected an object"))?;
    let entries = map
        .iter()
        .map(|(trigger, sub)| Ok((trigger.clone(), SchemaDocument::parse_nested(sub, ctx)?)))
        .collect::<SchemaResult<Vec<_>>>()?;
    Ok(Box::new(DependentSchemasKeyword { entries }))
}
