//! Assertion keywords
//!
//! Type predicates, numeric bounds, string and collection size checks, and
//! the presence keywords. Every `validate` gates on the instance type: a
//! keyword that does not apply to the instance returns a passing empty
//! node.

use serde_json::{json, Map, Number, Value};

use crate::annotations::keys;
use crate::context::ValidationContext;
use crate::draft::{Draft, DraftSet};
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::{sequence, Keyword, ParseContext};
use crate::result::ValidationResult;
use crate::utils::{is_multiple_of, is_whole_number, json_eq, type_name_of, unicode_length};

fn expect_number(name: &str, value: &Value) -> SchemaResult<Number> {
    value
        .as_number()
        .cloned()
        .ok_or_else(|| SchemaError::keyword(name, "expected a number"))
}

fn expect_count(name: &str, value: &Value) -> SchemaResult<(Number, u64)> {
    let number = expect_number(name, value)?;
    let count = number
        .as_u64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        })
        .ok_or_else(|| SchemaError::keyword(name, "expected a non-negative integer"))?;
    Ok((number, count))
}

fn expect_string_array(name: &str, value: &Value) -> SchemaResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| SchemaError::keyword(name, "expected an array of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| SchemaError::keyword(name, "expected an array of strings"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// type

const TYPE_NAMES: &[&str] = &[
    "null", "boolean", "object", "array", "number", "string", "integer",
];

/// `type`: single name or array of names
#[derive(Debug)]
pub struct TypeKeyword {
    types: Vec<String>,
    single: bool,
}

impl TypeKeyword {
    fn type_matches(name: &str, instance: &Value) -> bool {
        match name {
            "null" => instance.is_null(),
            "boolean" => instance.is_boolean(),
            "object" => instance.is_object(),
            "array" => instance.is_array(),
            "string" => instance.is_string(),
            "number" => instance.is_number(),
            "integer" => is_whole_number(instance),
            _ => false,
        }
    }
}

impl Keyword for TypeKeyword {
    fn name(&self) -> &str {
        "type"
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result("type");
        if self.types.iter().any(|t| Self::type_matches(t, instance)) {
            return result;
        }

        let expected = if self.single {
            json!(self.types[0])
        } else {
            json!(self.types)
        };
        result
            .info("expected", expected)
            .info("actual", json!(type_name_of(instance)))
            .fail("Value is {{actual}} but should be {{expected}}")
    }

    fn to_json(&self) -> Value {
        if self.single {
            json!(self.types[0])
        } else {
            json!(self.types)
        }
    }
}

pub(crate) fn parse_type(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let (types, single) = match value {
        Value::String(name) => (vec![name.clone()], true),
        Value::Array(names) => {
            let collected = names
                .iter()
                .map(|n| {
                    n.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| SchemaError::keyword("type", "expected a string or array of strings"))
                })
                .collect::<SchemaResult<Vec<_>>>()?;
            (collected, false)
        }
        _ => {
            return Err(SchemaError::keyword(
                "type",
                "expected a string or array of strings",
            ))
        }
    };

    for name in &types {
        if !TYPE_NAMES.contains(&name.as_str()) {
            return Err(SchemaError::keyword(
                "type",
                format!("unknown type name '{}'", name),
            ));
        }
    }

    Ok(Box::new(TypeKeyword { types, single }))
}

// ---------------------------------------------------------------------------
// enum / const

/// `enum`: structural equality against any candidate
#[derive(Debug)]
pub struct EnumKeyword {
    values: Vec<Value>,
}

impl Keyword for EnumKeyword {
    fn name(&self) -> &str {
        "enum"
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result("enum");
        if self.values.iter().any(|candidate| json_eq(candidate, instance)) {
            result
        } else {
            result.fail("Value does not match any of the enumerated values")
        }
    }

    fn to_json(&self) -> Value {
        Value::Array(self.values.clone())
    }
}

pub(crate) fn parse_enum(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let values = value
        .as_array()
        .ok_or_else(|| SchemaError::keyword("enum", "expected an array"))?;
    Ok(Box::new(EnumKeyword {
        values: values.clone(),
    }))
}

/// `const`: structural equality against one value
#[derive(Debug)]
pub struct ConstKeyword {
    value: Value,
}

impl Keyword for ConstKeyword {
    fn name(&self) -> &str {
        "const"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::FROM_DRAFT6
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result("const");
        if json_eq(&self.value, instance) {
            result
        } else {
            result
                .info("expected", self.value.clone())
                .fail("Value does not equal the expected constant {{expected}}")
        }
    }

    fn to_json(&self) -> Value {
        self.value.clone()
    }
}

pub(crate) fn parse_const(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(ConstKeyword {
        value: value.clone(),
    }))
}

// ---------------------------------------------------------------------------
// numeric bounds

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundKind {
    Minimum,
    Maximum,
}

/// `minimum` / `maximum` / `exclusiveMinimum` / `exclusiveMaximum`
///
/// Draft 04 expresses exclusivity as a boolean sibling of `minimum` and
/// `maximum`; later drafts use standalone numeric keywords. Both forms
/// parse into this type.
#[derive(Debug)]
pub struct BoundKeyword {
    name: &'static str,
    limit: Number,
    kind: BoundKind,
    exclusive: bool,
}

impl Keyword for BoundKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result(self.name);
        let Some(value) = instance.as_f64() else {
            return result;
        };
        let Some(limit) = self.limit.as_f64() else {
            return result;
        };

        let within = match (self.kind, self.exclusive) {
            (BoundKind::Minimum, false) => value >= limit,
            (BoundKind::Minimum, true) => value > limit,
            (BoundKind::Maximum, false) => value <= limit,
            (BoundKind::Maximum, true) => value < limit,
        };
        if within {
            return result;
        }

        let result = result
            .info("value", instance.clone())
            .info(self.name, Value::Number(self.limit.clone()));
        match (self.kind, self.exclusive) {
            (BoundKind::Minimum, false) => result.fail("{{value}} is less than minimum {{minimum}}"),
            (BoundKind::Minimum, true) => {
                result.fail(&format!("{{{{value}}}} is not strictly greater than {{{{{}}}}}", self.name))
            }
            (BoundKind::Maximum, false) => result.fail("{{value}} is greater than maximum {{maximum}}"),
            (BoundKind::Maximum, true) => {
                result.fail(&format!("{{{{value}}}} is not strictly less than {{{{{}}}}}", self.name))
            }
        }
    }

    fn to_json(&self) -> Value {
        Value::Number(self.limit.clone())
    }
}

/// Draft-04 boolean `exclusiveMinimum` / `exclusiveMaximum`
///
/// The flag modifies its numeric sibling and asserts nothing on its own;
/// it is kept for round-tripping.
#[derive(Debug)]
pub struct ExclusiveFlagKeyword {
    name: &'static str,
    enabled: bool,
}

impl Keyword for ExclusiveFlagKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::DRAFT4
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        ctx.keyword_result(self.name)
    }

    fn to_json(&self) -> Value {
        Value::Bool(self.enabled)
    }
}

fn sibling_flag(raw: &Map<String, Value>, name: &str) -> bool {
    raw.get(name).and_then(Value::as_bool) == Some(true)
}

pub(crate) fn parse_minimum(
    value: &Value,
    raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(BoundKeyword {
        name: "minimum",
        limit: expect_number("minimum", value)?,
        kind: BoundKind::Minimum,
        exclusive: ctx.draft == Draft::Draft4 && sibling_flag(raw, "exclusiveMinimum"),
    }))
}

pub(crate) fn parse_maximum(
    value: &Value,
    raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(BoundKeyword {
        name: "maximum",
        limit: expect_number("maximum", value)?,
        kind: BoundKind::Maximum,
        exclusive: ctx.draft == Draft::Draft4 && sibling_flag(raw, "exclusiveMaximum"),
    }))
}

pub(crate) fn parse_exclusive_minimum(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    if ctx.draft == Draft::Draft4 {
        let enabled = value.as_bool().ok_or_else(|| {
            SchemaError::keyword("exclusiveMinimum", "expected a boolean in draft-04")
        })?;
        return Ok(Box::new(ExclusiveFlagKeyword {
            name: "exclusiveMinimum",
            enabled,
        }));
    }
    Ok(Box::new(BoundKeyword {
        name: "exclusiveMinimum",
        limit: expect_number("exclusiveMinimum", value)?,
        kind: BoundKind::Minimum,
        exclusive: true,
    }))
}

pub(crate) fn parse_exclusive_maximum(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    if ctx.draft == Draft::Draft4 {
        let enabled = value.as_bool().ok_or_else(|| {
            SchemaError::keyword("exclusiveMaximum", "expected a boolean in draft-04")
        })?;
        return Ok(Box::new(ExclusiveFlagKeyword {
            name: "exclusiveMaximum",
            enabled,
        }));
    }
    Ok(Box::new(BoundKeyword {
        name: "exclusiveMaximum",
        limit: expect_number("exclusiveMaximum", value)?,
        kind: BoundKind::Maximum,
        exclusive: true,
    }))
}

/// `multipleOf`: exact decimal divisibility
#[derive(Debug)]
pub struct MultipleOfKeyword {
    factor: Number,
}

impl Keyword for MultipleOfKeyword {
    fn name(&self) -> &str {
        "multipleOf"
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result("multipleOf");
        let Some(value) = instance.as_f64() else {
            return result;
        };
        let Some(factor) = self.factor.as_f64() else {
            return result;
        };

        if is_multiple_of(value, factor) {
            result
        } else {
            result
                .info("value", instance.clone())
                .info("multipleOf", Value::Number(self.factor.clone()))
                .fail("{{value}} is not a multiple of {{multipleOf}}")
        }
    }

    fn to_json(&self) -> Value {
        Value::Number(self.factor.clone())
    }
}

pub(crate) fn parse_multiple_of(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let factor = expect_number("multipleOf", value)?;
    if factor.as_f64().map(|f| f <= 0.0).unwrap_or(true) {
        return Err(SchemaError::keyword("multipleOf", "expected a positive number"));
    }
    Ok(Box::new(MultipleOfKeyword { factor }))
}

// ---------------------------------------------------------------------------
// string length and pattern

/// `minLength` / `maxLength`: counted in Unicode code points
#[derive(Debug)]
pub struct LengthBoundKeyword {
    name: &'static str,
    raw: Number,
    limit: u64,
    kind: BoundKind,
}

impl Keyword for LengthBoundKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result(self.name);
        let Some(text) = instance.as_str() else {
            return result;
        };

        let length = unicode_length(text) as u64;
        let within = match self.kind {
            BoundKind::Minimum => length >= self.limit,
            BoundKind::Maximum => length <= self.limit,
        };
        if within {
            return result;
        }

        let relation = match self.kind {
            BoundKind::Minimum => "fewer",
            BoundKind::Maximum => "more",
        };
        result
            .info("length", json!(length))
            .info(self.name, Value::Number(self.raw.clone()))
            .fail(&format!(
                "String has {{{{length}}}} characters, {} than {} {{{{{}}}}}",
                relation, self.name, self.name
            ))
    }

    fn to_json(&self) -> Value {
        Value::Number(self.raw.clone())
    }
}

pub(crate) fn parse_min_length(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let (raw, limit) = expect_count("minLength", value)?;
    Ok(Box::new(LengthBoundKeyword {
        name: "minLength",
        raw,
        limit,
        kind: BoundKind::Minimum,
    }))
}

pub(crate) fn parse_max_length(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let (raw, limit) = expect_count("maxLength", value)?;
    Ok(Box::new(LengthBoundKeyword {
        name: "maxLength",
        raw,
        limit,
        kind: BoundKind::Maximum,
    }))
}

/// `pattern`: ECMA-262 style regular expression, matched anywhere
#[derive(Debug)]
pub struct PatternKeyword {
    pattern: String,
    regex: regex::Regex,
}

impl Keyword for PatternKeyword {
    fn name(&self) -> &str {
        "pattern"
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result("pattern");
        let Some(text) = instance.as_str() else {
            return result;
        };

        if self.regex.is_match(text) {
            result
        } else {
            result
                .info("pattern", json!(self.pattern))
                .fail("String does not match pattern {{pattern}}")
        }
    }

    fn to_json(&self) -> Value {
        json!(self.pattern)
    }
}

pub(crate) fn parse_pattern(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let pattern = value
        .as_str()
        .ok_or_else(|| SchemaError::keyword("pattern", "expected a string"))?;
    Ok(Box::new(PatternKeyword {
        pattern: pattern.to_string(),
        regex: regex::Regex::new(pattern)?,
    }))
}

// ---------------------------------------------------------------------------
// array size and uniqueness

/// `minItems` / `maxItems`
#[derive(Debug)]
pub struct ItemsBoundKeyword {
    name: &'static str,
    raw: Number,
    limit: u64,
    kind: BoundKind,
}

impl Keyword for ItemsBoundKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result(self.name);
        let Some(items) = instance.as_array() else {
            return result;
        };

        let count = items.len() as u64;
        let within = match self.kind {
            BoundKind::Minimum => count >= self.limit,
            BoundKind::Maximum => count <= self.limit,
        };
        if within {
            return result;
        }

        let relation = match self.kind {
            BoundKind::Minimum => "fewer",
            BoundKind::Maximum => "more",
        };
        result
            .info("count", json!(count))
            .info(self.name, Value::Number(self.raw.clone()))
            .fail(&format!(
                "Array has {{{{count}}}} items, {} than {} {{{{{}}}}}",
                relation, self.name, self.name
            ))
    }

    fn to_json(&self) -> Value {
        Value::Number(self.raw.clone())
    }
}

pub(crate) fn parse_min_items(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let (raw, limit) = expect_count("minItems", value)?;
    Ok(Box::new(ItemsBoundKeyword {
        name: "minItems",
        raw,
        limit,
        kind: BoundKind::Minimum,
    }))
}

pub(crate) fn parse_max_items(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let (raw, limit) = expect_count("maxItems", value)?;
    Ok(Box::new(ItemsBoundKeyword {
        name: "maxItems",
        raw,
        limit,
        kind: BoundKind::Maximum,
    }))
}

/// `uniqueItems`: structural-equality uniqueness
#[derive(Debug)]
pub struct UniqueItemsKeyword {
    unique: bool,
}

impl Keyword for UniqueItemsKeyword {
    fn name(&self) -> &str {
        "uniqueItems"
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result("uniqueItems");
        if !self.unique {
            return result;
        }
        let Some(items) = instance.as_array() else {
            return result;
        };

        for (i, left) in items.iter().enumerate() {
            for right in items.iter().skip(i + 1) {
                if json_eq(left, right) {
                    return result
                        .info("duplicate", left.clone())
                        .fail("Array items are not unique: {{duplicate}} appears more than once");
                }
            }
        }
        result
    }

    fn to_json(&self) -> Value {
        Value::Bool(self.unique)
    }
}

pub(crate) fn parse_unique_items(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let unique = value
        .as_bool()
        .ok_or_else(|| SchemaError::keyword("uniqueItems", "expected a boolean"))?;
    Ok(Box::new(UniqueItemsKeyword { unique }))
}

// ---------------------------------------------------------------------------
// object size and presence

/// `minProperties` / `maxProperties`
#[derive(Debug)]
pub struct PropertiesBoundKeyword {
    name: &'static str,
    raw: Number,
    limit: u64,
    kind: BoundKind,
}

impl Keyword for PropertiesBoundKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result(self.name);
        let Some(object) = instance.as_object() else {
            return result;
        };

        let count = object.len() as u64;
        let within = match self.kind {
            BoundKind::Minimum => count >= self.limit,
            BoundKind::Maximum => count <= self.limit,
        };
        if within {
            return result;
        }

        let relation = match self.kind {
            BoundKind::Minimum => "fewer",
            BoundKind::Maximum => "more",
        };
        result
            .info("count", json!(count))
            .info(self.name, Value::Number(self.raw.clone()))
            .fail(&format!(
                "Object has {{{{count}}}} properties, {} than {} {{{{{}}}}}",
                relation, self.name, self.name
            ))
    }

    fn to_json(&self) -> Value {
        Value::Number(self.raw.clone())
    }
}

pub(crate) fn parse_min_properties(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let (raw, limit) = expect_count("minProperties", value)?;
    Ok(Box::new(PropertiesBoundKeyword {
        name: "minProperties",
        raw,
        limit,
        kind: BoundKind::Minimum,
    }))
}

pub(crate) fn parse_max_properties(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let (raw, limit) = expect_count("maxProperties", value)?;
    Ok(Box::new(PropertiesBoundKeyword {
        name: "maxProperties",
        raw,
        limit,
        kind: BoundKind::Maximum,
    }))
}

/// `required`: listed keys must be present
#[derive(Debug)]
pub struct RequiredKeyword {
    properties: Vec<String>,
}

impl Keyword for RequiredKeyword {
    fn name(&self) -> &str {
        "required"
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result("required");
        let Some(object) = instance.as_object() else {
            return result;
        };

        let missing: Vec<&String> = self
            .properties
            .iter()
            .filter(|p| !object.contains_key(p.as_str()))
            .collect();
        if missing.is_empty() {
            result
        } else {
            result
                .info("missing", json!(missing))
                .fail("Required properties {{missing}} are absent")
        }
    }

    fn to_json(&self) -> Value {
        json!(self.properties)
    }
}

pub(crate) fn parse_required(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(RequiredKeyword {
        properties: expect_string_array("required", value)?,
    }))
}

/// `dependentRequired`: keys required when a trigger key is present
#[derive(Debug)]
pub struct DependentRequiredKeyword {
    dependencies: Vec<(String, Vec<String>)>,
}

impl Keyword for DependentRequiredKeyword {
    fn name(&self) -> &str {
        "dependentRequired"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::DRAFT2019_09
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result("dependentRequired");
        let Some(object) = instance.as_object() else {
            return result;
        };

        for (trigger, required) in &self.dependencies {
            if !object.contains_key(trigger) {
                continue;
            }
            let missing: Vec<&String> = required
                .iter()
                .filter(|p| !object.contains_key(p.as_str()))
                .collect();
            if !missing.is_empty() {
                return result
                    .info("property", json!(trigger))
                    .info("missing", json!(missing))
                    .fail("Property {{property}} requires {{missing}}");
            }
        }
        result
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (trigger, required) in &self.dependencies {
            map.insert(trigger.clone(), json!(required));
        }
        Value::Object(map)
    }
}

pub(crate) fn parse_dependent_required(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let entries = value
        .as_object()
        .ok_or_else(|| SchemaError::keyword("dependentRequired", "expected an object"))?;
    let dependencies = entries
        .iter()
        .map(|(trigger, required)| {
            Ok((trigger.clone(), expect_string_array("dependentRequired", required)?))
        })
        .collect::<SchemaResult<Vec<_>>>()?;
    Ok(Box::new(DependentRequiredKeyword { dependencies }))
}

// ---------------------------------------------------------------------------
// contains bounds

/// `minContains` / `maxContains`: consume the count published by `contains`
///
/// When `contains` did not run there is nothing to bound and the check is
/// not applicable.
#[derive(Debug)]
pub struct ContainsBoundKeyword {
    name: &'static str,
    raw: Number,
    limit: u64,
    kind: BoundKind,
}

impl Keyword for ContainsBoundKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::DRAFT2019_09
    }

    fn evaluation_sequence(&self) -> u32 {
        sequence::GATED
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let count = ctx
            .annotation(keys::CONTAINS_COUNT)
            .and_then(|a| a.as_count());
        let result = ctx.keyword_result(self.name);
        let Some(count) = count else {
            return result;
        };

        let count = count as u64;
        let within = match self.kind {
            BoundKind::Minimum => count >= self.limit,
            BoundKind::Maximum => count <= self.limit,
        };
        if within {
            return result;
        }

        let relation = match self.kind {
            BoundKind::Minimum => "fewer",
            BoundKind::Maximum => "more",
        };
        result
            .info("count", json!(count))
            .info(self.name, Value::Number(self.raw.clone()))
            .fail(&format!(
                "Array has {{{{count}}}} matching items, {} than {} {{{{{}}}}}",
                relation, self.name, self.name
            ))
    }

    fn to_json(&self) -> Value {
        Value::Number(self.raw.clone())
    }
}

pub(crate) fn parse_min_contains(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let (raw, limit) = expect_count("minContains", value)?;
    Ok(Box::new(ContainsBoundKeyword {
        name: "minContains",
        raw,
        limit,
        kind: BoundKind::Minimum,
    }))
}

pub(crate) fn parse_max_contains(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let (raw, limit) = expect_count("maxContains", value)?;
    Ok(Box::new(ContainsBoundKeyword {
        name: "maxContains",
        raw,
        limit,
        kind: BoundKind::Maximum,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationOptions;
    use crate::context::ValidationScope;
    use crate::registry::SchemaRegistry;

    fn ctx_for(instance: &Value) -> ValidationContext<'_> {
        let scope = ValidationScope::new(ValidationOptions::default(), SchemaRegistry::global());
        ValidationContext::new(instance, None, scope)
    }

    fn parse_in_default_ctx(
        parser: crate::keyword::ParseFn,
        value: Value,
    ) -> Box<dyn Keyword> {
        let options = ValidationOptions::default();
        let ctx = ParseContext::new(Draft::Draft201909, None, &options);
        parser(&value, &Map::new(), &ctx).unwrap()
    }

    #[test]
    fn test_type_integer_accepts_whole_floats() {
        let keyword = parse_in_default_ctx(parse_type, json!("integer"));

        let instance = json!(5.0);
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);

        let instance = json!(5.5);
        assert!(!keyword.validate(&mut ctx_for(&instance)).is_valid);
    }

    #[test]
    fn test_type_array_of_names() {
        let keyword = parse_in_default_ctx(parse_type, json!(["string", "null"]));

        let instance = json!(null);
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);

        let instance = json!(1);
        let result = keyword.validate(&mut ctx_for(&instance));
        assert!(!result.is_valid);
        assert!(result.error().unwrap().contains("number"));
    }

    #[test]
    fn test_type_rejects_unknown_name() {
        let options = ValidationOptions::default();
        let ctx = ParseContext::new(Draft::Draft201909, None, &options);
        assert!(parse_type(&json!("integerish"), &Map::new(), &ctx).is_err());
    }

    #[test]
    fn test_enum_numeric_equality() {
        let keyword = parse_in_default_ctx(parse_enum, json!([1, "two"]));

        let instance = json!(1.0);
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);

        let instance = json!(2);
        assert!(!keyword.validate(&mut ctx_for(&instance)).is_valid);
    }

    #[test]
    fn test_bounds() {
        let minimum = parse_in_default_ctx(parse_minimum, json!(0));
        let instance = json!(-1);
        assert!(!minimum.validate(&mut ctx_for(&instance)).is_valid);
        let instance = json!(0);
        assert!(minimum.validate(&mut ctx_for(&instance)).is_valid);

        let exclusive = parse_in_default_ctx(parse_exclusive_maximum, json!(10));
        let instance = json!(10);
        assert!(!exclusive.validate(&mut ctx_for(&instance)).is_valid);
        let instance = json!(9.99);
        assert!(exclusive.validate(&mut ctx_for(&instance)).is_valid);
    }

    #[test]
    fn test_draft4_boolean_exclusive_minimum() {
        let options = ValidationOptions::default();
        let ctx = ParseContext::new(Draft::Draft4, None, &options);

        let mut raw = Map::new();
        raw.insert("minimum".to_string(), json!(0));
        raw.insert("exclusiveMinimum".to_string(), json!(true));

        let minimum = parse_minimum(&json!(0), &raw, &ctx).unwrap();
        let instance = json!(0);
        assert!(!minimum.validate(&mut ctx_for(&instance)).is_valid);
        let instance = json!(1);
        assert!(minimum.validate(&mut ctx_for(&instance)).is_valid);

        // the boolean sibling itself asserts nothing
        let flag = parse_exclusive_minimum(&json!(true), &raw, &ctx).unwrap();
        let instance = json!(0);
        assert!(flag.validate(&mut ctx_for(&instance)).is_valid);
    }

    #[test]
    fn test_multiple_of_decimal() {
        let keyword = parse_in_default_ctx(parse_multiple_of, json!(0.1));
        let instance = json!(0.3);
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);

        let instance = json!(0.35);
        assert!(!keyword.validate(&mut ctx_for(&instance)).is_valid);
    }

    #[test]
    fn test_length_counts_code_points() {
        let keyword = parse_in_default_ctx(parse_max_length, json!(3));
        let instance = json!("héé");
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);

        let instance = json!("hééé");
        assert!(!keyword.validate(&mut ctx_for(&instance)).is_valid);

        // non-strings are not applicable
        let instance = json!(12345);
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);
    }

    #[test]
    fn test_pattern_matches_anywhere() {
        let keyword = parse_in_default_ctx(parse_pattern, json!("b+"));
        let instance = json!("abbc");
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);

        let instance = json!("ac");
        assert!(!keyword.validate(&mut ctx_for(&instance)).is_valid);
    }

    #[test]
    fn test_unique_items_structural() {
        let keyword = parse_in_default_ctx(parse_unique_items, json!(true));
        let instance = json!([1, 2, 1.0]);
        assert!(!keyword.validate(&mut ctx_for(&instance)).is_valid);

        let instance = json!([{"a": 1}, {"a": 2}]);
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);
    }

    #[test]
    fn test_required() {
        let keyword = parse_in_default_ctx(parse_required, json!(["a", "b"]));
        let instance = json!({"a": 1});
        let result = keyword.validate(&mut ctx_for(&instance));
        assert!(!result.is_valid);
        assert!(result.error().unwrap().contains("b"));
    }

    #[test]
    fn test_dependent_required() {
        let keyword =
            parse_in_default_ctx(parse_dependent_required, json!({"credit_card": ["billing_address"]}));

        let instance = json!({"credit_card": "4111"});
        assert!(!keyword.validate(&mut ctx_for(&instance)).is_valid);

        let instance = json!({"credit_card": "4111", "billing_address": "x"});
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);

        let instance = json!({"name": "y"});
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);
    }

    #[test]
    fn test_contains_bounds_not_applicable_without_producer() {
        let keyword = parse_in_default_ctx(parse_min_contains, json!(2));
        let instance = json!([1, 2, 3]);
        // no contains annotation in the frame
        assert!(keyword.validate(&mut ctx_for(&instance)).is_valid);
    }

    #[test]
    fn test_contains_bounds_consume_count() {
        use crate::annotations::AnnotationValue;

        let min = parse_in_default_ctx(parse_min_contains, json!(2));
        let max = parse_in_default_ctx(parse_max_contains, json!(2));

        let instance = json!([7, 7, 7]);
        let mut ctx = ctx_for(&instance);
        ctx.set_annotation(keys::CONTAINS_COUNT, AnnotationValue::Count(3));

        assert!(min.validate(&mut ctx).is_valid);
        assert!(!max.validate(&mut ctx).is_valid);
    }
}
