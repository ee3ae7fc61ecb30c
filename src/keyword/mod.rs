//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Keyword abstraction and implementations
//!
//! Every schema keyword is a small state object carrying its parsed value
//! and implementing the `Keyword` trait. The catalog maps keyword names to
//! parse constructors together with their supported drafts, vocabulary, and
//! evaluation sequence.

pub mod applicator;
pub mod catalog;
pub mod content;
pub mod core;
pub mod format;
pub mod metadata;
pub mod validation;

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::config::ValidationOptions;
use crate::context::ValidationContext;
use crate::draft::{Draft, DraftSet};
use crate::error::SchemaResult;
use crate::registry::LocalRegistry;
use crate::result::ValidationResult;
use crate::schema::SchemaDocument;

// Re-export the catalog entry points
pub use catalog::{lookup, KeywordDescriptor};

/// Keyword vocabulary, used for 2019-09 vocabulary gating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    /// Identifiers and references
    Core,

    /// Keywords that apply subschemas
    Applicator,

    /// Assertion keywords
    Validation,

    /// Semantic format annotations
    Format,

    /// Content decoding keywords
    Content,

    /// Non-asserting metadata
    MetaData,
}

impl Vocabulary {
    /// Resolve a 2019-09 vocabulary URI
    pub fn from_uri(uri: &str) -> Option<Vocabulary> {
        match uri {
            "https://json-schema.org/draft/2019-09/vocab/core" => Some(Vocabulary::Core),
            "https://json-schema.org/draft/2019-09/vocab/applicator" => Some(Vocabulary::Applicator),
            "https://json-schema.org/draft/2019-09/vocab/validation" => Some(Vocabulary::Validation),
            "https://json-schema.org/draft/2019-09/vocab/format" => Some(Vocabulary::Format),
            "https://json-schema.org/draft/2019-09/vocab/content" => Some(Vocabulary::Content),
            "https://json-schema.org/draft/2019-09/vocab/meta-data" => Some(Vocabulary::MetaData),
            _ => None,
        }
    }
}

/// Evaluation sequence bands
///
/// Lower runs earlier. Later keywords may read annotations written by
/// strictly earlier keywords of the same schema object.
pub mod sequence {
    /// `$id`, `$anchor`, `$recursiveAnchor`, `$defs`, `definitions`
    pub const IDENTIFIERS: u32 = 0;

    /// `$ref` and `$recursiveRef`
    pub const REFERENCES: u32 = 5;

    /// Plain assertions and annotations
    pub const CHECKS: u32 = 10;

    /// Applicators that write annotations: `properties`, `items`,
    /// `contains`, `if`, the combinators
    pub const APPLICATORS: u32 = 20;

    /// Keywords gated on earlier annotations: `additionalProperties`,
    /// `additionalItems`, `then`, `else`, `minContains`, `maxContains`
    pub const GATED: u32 = 30;

    /// `unevaluatedProperties` and `unevaluatedItems`
    pub const UNEVALUATED: u32 = 90;
}

/// One schema keyword
///
/// Implementations are immutable after construction. `validate` returns a
/// result node; a keyword that does not apply to the instance type returns
/// a passing empty node.
pub trait Keyword: fmt::Debug + Send + Sync {
    /// Keyword name, unique within a draft
    fn name(&self) -> &str;

    /// Drafts in which this keyword applies
    fn supported_drafts(&self) -> DraftSet {
        DraftSet::ALL
    }

    /// Vocabulary this keyword belongs to
    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Validation
    }

    /// Evaluation sequence; lower runs earlier, ties broken by insertion
    fn evaluation_sequence(&self) -> u32 {
        sequence::CHECKS
    }

    /// Evaluate the keyword against the frame's instance
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult;

    /// Walk contained subschemas, binding ids and anchors into the registry
    fn register_subschemas(&self, _base: Option<&Url>, _registry: &mut LocalRegistry) {}

    /// Walk contained subschemas along a JSON Pointer
    fn resolve_subschema(&self, _pointer: &[String]) -> Option<Arc<SchemaDocument>> {
        None
    }

    /// Serialize back to the keyword's JSON value
    fn to_json(&self) -> Value;

    /// Structural equality
    fn equals(&self, other: &dyn Keyword) -> bool {
        self.name() == other.name() && self.to_json() == other.to_json()
    }
}

/// Parse-time context threaded through keyword constructors
///
/// Carries the active draft, the base URI of the enclosing schema object
/// (already updated for its `$id`), the disabled-vocabulary set inherited
/// from the document root, and the engine options.
pub struct ParseContext<'o> {
    /// Active draft
    pub draft: Draft,

    /// Base URI of the enclosing schema object
    pub base_uri: Option<Url>,

    /// Vocabularies the document's meta-schema disables
    pub disabled_vocabularies: Vec<Vocabulary>,

    /// Engine options
    pub options: &'o ValidationOptions,
}

impl<'o> ParseContext<'o> {
    /// Create a root parse context
    pub fn new(draft: Draft, base_uri: Option<Url>, options: &'o ValidationOptions) -> Self {
        Self {
            draft,
            base_uri,
            disabled_vocabularies: Vec::new(),
            options,
        }
    }

    /// Derive a context for a nested schema object with a new base
    pub fn nested(&self, base_uri: Option<Url>) -> ParseContext<'o> {
        ParseContext {
            draft: self.draft,
            base_uri,
            disabled_vocabularies: self.disabled_vocabularies.clone(),
            options: self.options,
        }
    }
}

/// Constructor signature stored in the catalog
///
/// Receives the keyword's value, the raw sibling map of the schema object
/// (for keywords whose meaning depends on siblings, e.g. the draft-04
/// boolean `exclusiveMinimum` or `contains` with bounds), and the parse
/// context.
pub type ParseFn =
    fn(&Value, &Map<String, Value>, &ParseContext<'_>) -> SchemaResult<Box<dyn Keyword>>;
