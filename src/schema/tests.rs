//! End-to-end validation tests
//!
//! Whole-engine scenarios: keyword interplay, annotation flow, references,
//! recursion, draft behavior, and output assembly.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::ValidationOptions;
use crate::output::{OutputFormat, OutputFormatter};
use crate::registry::SchemaRegistry;
use crate::schema::{SchemaDocument, Validator};

fn check(schema: Value, instance: Value, expected: bool) {
    let validator = Validator::new(&schema).expect("schema parses");
    let result = validator.validate(&instance);
    assert_eq!(
        result.is_valid, expected,
        "schema {} instance {} expected {}",
        schema, instance, expected
    );
    // flag mode must agree with the detailed verdict
    assert_eq!(validator.is_valid(&instance), expected);
}

#[test]
fn test_numeric_bounds() {
    let schema = json!({"type": "integer", "minimum": 0, "exclusiveMaximum": 10});
    check(schema.clone(), json!(5), true);
    check(schema.clone(), json!(10), false);
    check(schema.clone(), json!(-1), false);
    check(schema, json!(5.5), false);
}

#[test]
fn test_object_required_and_properties() {
    let schema = json!({
        "type": "object",
        "required": ["a"],
        "properties": {"a": {"type": "string"}}
    });
    check(schema.clone(), json!({"a": "x"}), true);
    check(schema.clone(), json!({"a": 1}), false);
    check(schema, json!({}), false);
}

#[test]
fn test_one_of_exactly_one() {
    let schema = json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]});
    // only the first branch matches
    check(schema.clone(), json!(-1), true);
    // both branches match
    check(schema.clone(), json!(3), false);
    // neither branch matches
    check(schema, json!(-1.5), false);
}

#[test]
fn test_self_referential_schema_terminates() {
    let schema = json!({
        "$id": "http://x/s",
        "$defs": {
            "n": {
                "type": "object",
                "properties": {"c": {"$ref": "#/$defs/n"}}
            }
        },
        "$ref": "#/$defs/n"
    });
    check(schema.clone(), json!({"c": {"c": {}}}), true);
    check(schema, json!({"c": {"c": 5}}), false);
}

#[test]
fn test_direct_ref_cycle_terminates() {
    let schema = json!({"$ref": "#"});
    check(schema, json!({"anything": [1, 2, 3]}), true);
}

#[test]
fn test_if_then_else() {
    let schema = json!({
        "if": {"type": "integer"},
        "then": {"minimum": 0},
        "else": {"type": "string"}
    });
    check(schema.clone(), json!(-1), false);
    check(schema.clone(), json!(1), true);
    check(schema.clone(), json!("text"), true);
    check(schema, json!(1.5), false);
}

#[test]
fn test_then_without_if_not_applicable() {
    let schema = json!({"then": {"minimum": 0}});
    check(schema, json!(-5), true);
}

#[test]
fn test_contains_with_min_contains() {
    let schema = json!({"type": "array", "contains": {"const": 7}, "minContains": 2});
    check(schema.clone(), json!([1, 7, 7, 3]), true);
    check(schema.clone(), json!([1, 7, 3]), false);
    check(schema, json!([]), false);
}

#[test]
fn test_min_contains_zero_overrides_contains() {
    let schema = json!({"contains": {"const": 7}, "minContains": 0});
    check(schema.clone(), json!([1, 2, 3]), true);
    check(schema, json!([]), true);
}

#[test]
fn test_max_contains() {
    let schema = json!({"contains": {"const": 7}, "maxContains": 2});
    check(schema.clone(), json!([7, 7]), true);
    check(schema, json!([7, 7, 7]), false);
}

#[test]
fn test_unevaluated_properties() {
    let schema = json!({"properties": {"a": {}}, "unevaluatedProperties": false});
    check(schema.clone(), json!({"a": 1}), true);
    check(schema, json!({"a": 1, "b": 2}), false);
}

#[test]
fn test_unevaluated_properties_sees_ref_annotations() {
    let schema = json!({
        "$defs": {"base": {"properties": {"a": {"type": "integer"}}}},
        "$ref": "#/$defs/base",
        "properties": {"b": {"type": "integer"}},
        "unevaluatedProperties": false
    });
    check(schema.clone(), json!({"a": 1, "b": 2}), true);
    check(schema, json!({"a": 1, "c": 3}), false);
}

#[test]
fn test_unevaluated_items_watermark() {
    let schema = json!({
        "items": [{"type": "integer"}],
        "unevaluatedItems": {"type": "string"}
    });
    check(schema.clone(), json!([1, "a", "b"]), true);
    check(schema, json!([1, "a", 2]), false);
}

#[test]
fn test_additional_properties_complement() {
    let schema = json!({
        "properties": {"a": {}},
        "patternProperties": {"^p_": {}},
        "additionalProperties": {"type": "integer"}
    });
    check(schema.clone(), json!({"a": "anything", "p_x": [], "other": 3}), true);
    check(schema, json!({"other": "not an integer"}), false);
}

#[test]
fn test_additional_items_after_tuple() {
    let schema = json!({
        "items": [{"type": "string"}, {"type": "integer"}],
        "additionalItems": {"type": "boolean"}
    });
    check(schema.clone(), json!(["a", 1, true, false]), true);
    check(schema.clone(), json!(["a", 1, "not bool"]), false);
    check(schema, json!(["a"]), true);
}

#[test]
fn test_property_names() {
    let schema = json!({"propertyNames": {"pattern": "^[a-z]+$"}});
    check(schema.clone(), json!({"abc": 1, "def": 2}), true);
    check(schema, json!({"Abc": 1}), false);
}

#[test]
fn test_dependent_schemas() {
    let schema = json!({
        "dependentSchemas": {
            "credit_card": {"required": ["billing_address"]}
        }
    });
    check(schema.clone(), json!({"credit_card": "4111"}), false);
    check(
        schema.clone(),
        json!({"credit_card": "4111", "billing_address": "x"}),
        true,
    );
    check(schema, json!({"name": "y"}), true);
}

#[test]
fn test_draft7_dependencies_both_forms() {
    let schema = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "dependencies": {
            "a": ["b"],
            "c": {"required": ["d"]}
        }
    });
    check(schema.clone(), json!({"a": 1, "b": 2}), true);
    check(schema.clone(), json!({"a": 1}), false);
    check(schema.clone(), json!({"c": 1, "d": 2}), true);
    check(schema, json!({"c": 1}), false);
}

#[test]
fn test_draft4_boolean_exclusive_bounds() {
    let schema = json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "minimum": 0,
        "exclusiveMinimum": true
    });
    check(schema.clone(), json!(0), false);
    check(schema, json!(1), true);
}

#[test]
fn test_pre_2019_ref_ignores_siblings() {
    let schema = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "definitions": {"any": {}},
        "$ref": "#/definitions/any",
        "type": "string"
    });
    // in draft-07 the sibling `type` must not run
    check(schema, json!(42), true);
}

#[test]
fn test_2019_ref_evaluates_siblings() {
    let schema = json!({
        "$defs": {"any": {}},
        "$ref": "#/$defs/any",
        "type": "string"
    });
    check(schema.clone(), json!(42), false);
    check(schema, json!("x"), true);
}

#[test]
fn test_unknown_keywords_are_annotations() {
    let schema = json!({
        "x-vendor-extension": {"whatever": true},
        "type": "integer"
    });
    check(schema, json!(5), true);
}

#[test]
fn test_keywords_from_later_drafts_ignored_in_earlier() {
    // unevaluatedProperties does not exist in draft-07; it must be
    // preserved as an annotation, never enforced and never an error
    let schema = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "properties": {"a": {}},
        "unevaluatedProperties": false
    });
    check(schema, json!({"a": 1, "b": 2}), true);
}

#[test]
fn test_nested_combinators_merge_annotations() {
    let schema = json!({
        "allOf": [
            {"properties": {"a": {"type": "integer"}}},
            {"properties": {"b": {"type": "integer"}}}
        ],
        "unevaluatedProperties": false
    });
    check(schema.clone(), json!({"a": 1, "b": 2}), true);
    check(schema, json!({"a": 1, "b": 2, "c": 3}), false);
}

#[test]
fn test_failed_branch_annotations_discarded() {
    // the failing anyOf branch must not mark `b` as evaluated
    let schema = json!({
        "anyOf": [
            {"properties": {"a": {"type": "integer"}}, "required": ["a"]},
            {"properties": {"b": {"type": "string"}}, "required": ["b"], "minProperties": 5}
        ],
        "unevaluatedProperties": false
    });
    check(schema, json!({"a": 1, "b": "x"}), false);
}

#[test]
fn test_recursive_ref_polymorphism() {
    let registry = SchemaRegistry::new();
    let options = ValidationOptions::default();

    let tree = json!({
        "$id": "http://example.com/tree",
        "$recursiveAnchor": true,
        "type": "object",
        "properties": {
            "data": true,
            "children": {
                "type": "array",
                "items": {"$recursiveRef": "#"}
            }
        }
    });
    let tree_doc = SchemaDocument::parse_rooted(&tree, None, &options).unwrap();
    registry.register("http://example.com/tree", tree_doc);

    let strict_tree = json!({
        "$id": "http://example.com/strict-tree",
        "$recursiveAnchor": true,
        "$ref": "http://example.com/tree",
        "unevaluatedProperties": false
    });

    let validator =
        Validator::with_registry(&strict_tree, options, Arc::clone(&registry)).unwrap();

    let ok = json!({"data": 1, "children": [{"data": 2, "children": []}]});
    assert!(validator.validate(&ok).is_valid);

    // the misspelled key sits in a child node; only the dynamic anchor
    // makes the outer unevaluatedProperties apply there
    let typo = json!({"children": [{"daat": 1}]});
    assert!(!validator.validate(&typo).is_valid);
}

#[test]
fn test_anchor_resolution() {
    let schema = json!({
        "$id": "http://example.com/anchored",
        "$defs": {
            "name": {"$anchor": "myAnchor", "type": "string"}
        },
        "$ref": "#myAnchor"
    });
    check(schema.clone(), json!("text"), true);
    check(schema, json!(42), false);
}

#[test]
fn test_ref_across_documents_via_download() {
    let registry = SchemaRegistry::new();
    let options = ValidationOptions::default().with_download(|uri| match uri {
        "http://example.com/remote-int" => Some(r#"{"type": "integer"}"#.to_string()),
        _ => None,
    });

    let schema = json!({"$ref": "http://example.com/remote-int"});
    let validator = Validator::with_registry(&schema, options, registry).unwrap();

    assert!(validator.validate(&json!(5)).is_valid);
    assert!(!validator.validate(&json!("x")).is_valid);
}

#[test]
fn test_unresolvable_ref_is_validation_failure_not_error() {
    let schema = json!({"$ref": "http://nowhere.example/missing"});
    let validator = Validator::new(&schema).unwrap();

    let result = validator.validate(&json!(1));
    assert!(!result.is_valid);
    let failures = result.failures();
    assert!(failures
        .iter()
        .any(|f| f.error().unwrap_or_default().contains("could not be resolved")));
}

#[test]
fn test_vocabulary_gating_disables_keywords() {
    let registry = SchemaRegistry::new();
    let options = ValidationOptions::default();

    // a meta-schema that enables only the core and applicator vocabularies
    let metaschema = json!({
        "$schema": "https://json-schema.org/draft/2019-09/schema",
        "$id": "http://example.com/core-only-meta",
        "$vocabulary": {
            "https://json-schema.org/draft/2019-09/vocab/core": true,
            "https://json-schema.org/draft/2019-09/vocab/applicator": true
        }
    });
    let meta_doc = SchemaDocument::parse_rooted(&metaschema, None, &options).unwrap();
    registry.register("http://example.com/core-only-meta", meta_doc);

    let schema = json!({
        "$schema": "http://example.com/core-only-meta",
        "type": "string"
    });
    let validator = Validator::with_registry(&schema, options, registry).unwrap();

    // `type` belongs to the disabled validation vocabulary
    assert!(validator.validate(&json!(42)).is_valid);
}

#[test]
fn test_determinism() {
    let schema = json!({
        "type": "object",
        "properties": {"a": {"type": "integer", "minimum": 3}},
        "required": ["a", "b"],
        "additionalProperties": false
    });
    let instance = json!({"a": 1, "c": 2});
    let validator = Validator::new(&schema).unwrap();

    let first = validator.validate(&instance);
    let second = validator.validate(&instance);
    assert_eq!(first.is_valid, second.is_valid);
    assert_eq!(first.error_count(), second.error_count());

    let first_messages: Vec<String> = first
        .failures()
        .iter()
        .map(|f| f.error().unwrap_or_default().to_string())
        .collect();
    let second_messages: Vec<String> = second
        .failures()
        .iter()
        .map(|f| f.error().unwrap_or_default().to_string())
        .collect();
    assert_eq!(first_messages, second_messages);
}

#[test]
fn test_basic_output_locations() {
    let schema = json!({
        "$id": "http://example.com/s",
        "properties": {"a": {"type": "string"}}
    });
    let validator = Validator::new(&schema).unwrap();
    let result = validator.validate(&json!({"a": 1}));

    let output = OutputFormatter::new(OutputFormat::Basic).render(&result);
    assert_eq!(output["valid"], json!(false));

    let errors = output["errors"].as_array().unwrap();
    let unit = errors
        .iter()
        .find(|e| e["keywordLocation"] == json!("/properties/a/type"))
        .expect("type failure reported");
    assert_eq!(unit["instanceLocation"], json!("/a"));
    assert_eq!(
        unit["absoluteKeywordLocation"],
        json!("http://example.com/s#/properties/a/type")
    );
}

#[test]
fn test_detailed_output_annotations() {
    let schema = json!({"title": "A schema", "type": "integer"});
    let validator = Validator::new(&schema).unwrap();
    let result = validator.validate(&json!(5));

    let output = OutputFormatter::new(OutputFormat::Detailed).render(&result);
    assert_eq!(output["valid"], json!(true));

    let annotations = output["annotations"].as_array().unwrap();
    assert!(annotations
        .iter()
        .any(|a| a["keywordLocation"] == json!("/title") && a["annotation"] == json!("A schema")));
}

#[test]
fn test_schema_roundtrip_through_registry_documents() {
    let schema = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$id": "http://example.com/roundtrip",
        "title": "Round trip",
        "type": ["object", "null"],
        "properties": {"a": {"enum": [1, "two", null]}},
        "if": {"required": ["a"]},
        "then": {"minProperties": 1},
        "x-custom": {"kept": true}
    });
    let options = ValidationOptions::default();
    let doc = SchemaDocument::parse_rooted(&schema, None, &options).unwrap();
    assert_eq!(doc.to_json(), schema);
}

#[test]
fn test_boolean_schemas() {
    check(json!(true), json!({"anything": 1}), true);
    check(json!(false), json!({"anything": 1}), false);
    check(json!({"properties": {"a": false}}), json!({}), true);
    check(json!({"properties": {"a": false}}), json!({"a": 1}), false);
}

#[test]
fn test_deep_instance_locations() {
    let schema = json!({
        "properties": {
            "outer": {
                "items": {"type": "integer"}
            }
        }
    });
    let validator = Validator::new(&schema).unwrap();
    let result = validator.validate(&json!({"outer": [1, "bad", 3]}));

    assert!(!result.is_valid);
    let failures = result.failures();
    assert!(failures
        .iter()
        .any(|f| f.instance_location.to_string() == "/outer/1"));
}

#[test]
fn test_enum_and_const_structural_equality() {
    check(json!({"enum": [[1, 2], {"a": 1}]}), json!([1, 2]), true);
    check(json!({"enum": [[1, 2], {"a": 1}]}), json!({"a": 1.0}), true);
    check(json!({"const": {"a": [1]}}), json!({"a": [1]}), true);
    check(json!({"const": {"a": [1]}}), json!({"a": [1, 2]}), false);
}

#[test]
fn test_metaschema_self_validation() {
    // each draft meta-schema validates its own JSON form
    for (uri, text) in crate::schema::metaschema::SEEDS {
        if !uri.contains("json-schema.org") {
            continue;
        }
        let value: Value = serde_json::from_str(text).unwrap();
        let validator = Validator::new(&value).expect("meta-schema parses");
        assert!(
            validator.validate(&value).is_valid,
            "{} fails self-validation",
            uri
        );
    }
}

#[test]
fn test_downloaded_schema_validated_against_metaschema() {
    let registry = SchemaRegistry::new();
    let options = ValidationOptions::default().with_download(|uri| match uri {
        "http://example.com/bad-remote" => Some(
            r#"{"$schema": "http://json-schema.org/draft-07/schema#", "type": 12}"#.to_string(),
        ),
        _ => None,
    });

    let outcome = Validator::with_registry(
        &json!({"$ref": "http://example.com/bad-remote"}),
        options,
        registry,
    );
    // parsing the referring schema succeeds; the load failure surfaces as
    // a resolution failure during validation
    let validator = outcome.unwrap();
    let result = validator.validate(&json!(1));
    assert!(!result.is_valid);
}
