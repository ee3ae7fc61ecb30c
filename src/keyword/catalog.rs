//! Keyword catalog
//!
//! The registry of keyword descriptors: name, supported drafts, vocabulary,
//! evaluation sequence, and parse constructor. Parsing a schema object
//! looks each property up here; names missing from the catalog (or not
//! defined in the active draft) are preserved as annotations.

use crate::draft::{Draft, DraftSet};
use crate::keyword::{applicator, content, core, format, metadata, sequence, validation};
use crate::keyword::{ParseFn, Vocabulary};

/// One catalog entry
pub struct KeywordDescriptor {
    /// Keyword name
    pub name: &'static str,

    /// Drafts in which the keyword applies
    pub drafts: DraftSet,

    /// Vocabulary the keyword belongs to
    pub vocabulary: Vocabulary,

    /// Evaluation sequence band
    pub sequence: u32,

    /// Parse constructor
    pub parse: ParseFn,
}

macro_rules! descriptor {
    ($name:literal, $drafts:expr, $vocabulary:expr, $sequence:expr, $parse:expr) => {
        KeywordDescriptor {
            name: $name,
            drafts: $drafts,
            vocabulary: $vocabulary,
            sequence: $sequence,
            parse: $parse,
        }
    };
}

static CATALOG: &[KeywordDescriptor] = &[
    // core: identifiers and references
    descriptor!("$id", DraftSet::FROM_DRAFT6, Vocabulary::Core, sequence::IDENTIFIERS, core::parse_id),
    descriptor!("id", DraftSet::DRAFT4, Vocabulary::Core, sequence::IDENTIFIERS, core::parse_id),
    descriptor!("$anchor", DraftSet::DRAFT2019_09, Vocabulary::Core, sequence::IDENTIFIERS, core::parse_anchor),
    descriptor!("$recursiveAnchor", DraftSet::DRAFT2019_09, Vocabulary::Core, sequence::IDENTIFIERS, core::parse_recursive_anchor),
    descriptor!("$defs", DraftSet::DRAFT2019_09, Vocabulary::Core, sequence::IDENTIFIERS, core::parse_defs),
    descriptor!("definitions", DraftSet::ALL, Vocabulary::Core, sequence::IDENTIFIERS, core::parse_definitions),
    descriptor!("$ref", DraftSet::ALL, Vocabulary::Core, sequence::REFERENCES, core::parse_ref),
    descriptor!("$recursiveRef", DraftSet::DRAFT2019_09, Vocabulary::Core, sequence::REFERENCES, core::parse_recursive_ref),
    // validation assertions
    descriptor!("type", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_type),
    descriptor!("enum", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_enum),
    descriptor!("const", DraftSet::FROM_DRAFT6, Vocabulary::Validation, sequence::CHECKS, validation::parse_const),
    descriptor!("minimum", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_minimum),
    descriptor!("maximum", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_maximum),
    descriptor!("exclusiveMinimum", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_exclusive_minimum),
    descriptor!("exclusiveMaximum", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_exclusive_maximum),
    descriptor!("multipleOf", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_multiple_of),
    descriptor!("minLength", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_min_length),
    descriptor!("maxLength", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_max_length),
    descriptor!("pattern", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_pattern),
    descriptor!("minItems", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_min_items),
    descriptor!("maxItems", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_max_items),
    descriptor!("uniqueItems", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_unique_items),
    descriptor!("minProperties", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_min_properties),
    descriptor!("maxProperties", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_max_properties),
    descriptor!("required", DraftSet::ALL, Vocabulary::Validation, sequence::CHECKS, validation::parse_required),
    descriptor!("dependentRequired", DraftSet::DRAFT2019_09, Vocabulary::Validation, sequence::CHECKS, validation::parse_dependent_required),
    descriptor!("minContains", DraftSet::DRAFT2019_09, Vocabulary::Validation, sequence::GATED, validation::parse_min_contains),
    descriptor!("maxContains", DraftSet::DRAFT2019_09, Vocabulary::Validation, sequence::GATED, validation::parse_max_contains),
    // applicators
    descriptor!("properties", DraftSet::ALL, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_properties),
    descriptor!("patternProperties", DraftSet::ALL, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_pattern_properties),
    descriptor!("additionalProperties", DraftSet::ALL, Vocabulary::Applicator, sequence::GATED, applicator::parse_additional_properties),
    descriptor!("propertyNames", DraftSet::FROM_DRAFT6, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_property_names),
    descriptor!("items", DraftSet::ALL, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_items),
    descriptor!("additionalItems", DraftSet::ALL, Vocabulary::Applicator, sequence::GATED, applicator::parse_additional_items),
    descriptor!("contains", DraftSet::FROM_DRAFT6, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_contains),
    descriptor!("allOf", DraftSet::ALL, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_all_of),
    descriptor!("anyOf", DraftSet::ALL, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_any_of),
    descriptor!("oneOf", DraftSet::ALL, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_one_of),
    descriptor!("not", DraftSet::ALL, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_not),
    descriptor!("if", DraftSet::FROM_DRAFT7, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_if),
    descriptor!("then", DraftSet::FROM_DRAFT7, Vocabulary::Applicator, sequence::GATED, applicator::parse_then),
    descriptor!("else", DraftSet::FROM_DRAFT7, Vocabulary::Applicator, sequence::GATED, applicator::parse_else),
    descriptor!("dependencies", DraftSet::THROUGH_DRAFT7, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_dependencies),
    descriptor!("dependentSchemas", DraftSet::DRAFT2019_09, Vocabulary::Applicator, sequence::APPLICATORS, applicator::parse_dependent_schemas),
    descriptor!("unevaluatedItems", DraftSet::DRAFT2019_09, Vocabulary::Applicator, sequence::UNEVALUATED, applicator::parse_unevaluated_items),
    descriptor!("unevaluatedProperties", DraftSet::DRAFT2019_09, Vocabulary::Applicator, sequence::UNEVALUATED, applicator::parse_unevaluated_properties),
    // format
    descriptor!("format", DraftSet::ALL, Vocabulary::Format, sequence::CHECKS, format::parse_format),
    // content
    descriptor!("contentEncoding", DraftSet::FROM_DRAFT7, Vocabulary::Content, sequence::CHECKS, content::parse_content_encoding),
    descriptor!("contentMediaType", DraftSet::FROM_DRAFT7, Vocabulary::Content, sequence::CHECKS, content::parse_content_media_type),
    descriptor!("contentSchema", DraftSet::DRAFT2019_09, Vocabulary::Content, sequence::CHECKS, content::parse_content_schema),
    // metadata
    descriptor!("title", DraftSet::ALL, Vocabulary::MetaData, sequence::CHECKS, metadata::parse_title),
    descriptor!("description", DraftSet::ALL, Vocabulary::MetaData, sequence::CHECKS, metadata::parse_description),
    descriptor!("default", DraftSet::ALL, Vocabulary::MetaData, sequence::CHECKS, metadata::parse_default),
    descriptor!("examples", DraftSet::FROM_DRAFT6, Vocabulary::MetaData, sequence::CHECKS, metadata::parse_examples),
    descriptor!("readOnly", DraftSet::FROM_DRAFT7, Vocabulary::MetaData, sequence::CHECKS, metadata::parse_read_only),
    descriptor!("writeOnly", DraftSet::FROM_DRAFT7, Vocabulary::MetaData, sequence::CHECKS, metadata::parse_write_only),
    descriptor!("deprecated", DraftSet::DRAFT2019_09, Vocabulary::MetaData, sequence::CHECKS, metadata::parse_deprecated),
    descriptor!("$comment", DraftSet::FROM_DRAFT7, Vocabulary::Core, sequence::CHECKS, metadata::parse_comment),
];

/// Look up a keyword descriptor by name within a draft
pub fn lookup(name: &str, draft: Draft) -> Option<&'static KeywordDescriptor> {
    CATALOG
        .iter()
        .find(|descriptor| descriptor.name == name && descriptor.drafts.contains(draft))
}

/// All registered descriptors
pub fn descriptors() -> &'static [KeywordDescriptor] {
    CATALOG
}
