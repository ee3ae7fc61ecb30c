//! Metadata and annotation keywords
//!
//! These never fail: they surface their value as an annotation on the
//! result node. Unknown keywords are preserved the same way, keeping
//! forward compatibility.

use serde_json::{Map, Value};

use crate::context::ValidationContext;
use crate::draft::DraftSet;
use crate::error::SchemaResult;
use crate::keyword::{Keyword, ParseContext, Vocabulary};
use crate::result::ValidationResult;

/// A named metadata keyword (`title`, `description`, `default`, ...)
#[derive(Debug)]
pub struct MetadataKeyword {
    name: &'static str,
    drafts: DraftSet,
    value: Value,
}

impl MetadataKeyword {
    fn boxed(name: &'static str, drafts: DraftSet, value: &Value) -> Box<dyn Keyword> {
        Box::new(Self {
            name,
            drafts,
            value: value.clone(),
        })
    }
}

impl Keyword for MetadataKeyword {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_drafts(&self) -> DraftSet {
        self.drafts
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::MetaData
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        ctx.keyword_result(self.name).annotate(self.value.clone())
    }

    fn to_json(&self) -> Value {
        self.value.clone()
    }
}

/// An unknown keyword preserved as an annotation
#[derive(Debug)]
pub struct AnnotationKeyword {
    name: String,
    value: Value,
}

impl AnnotationKeyword {
    /// Preserve an unrecognized schema property
    pub fn new(name: String, value: Value) -> Self {
        Self { name, value }
    }
}

impl Keyword for AnnotationKeyword {
    fn name(&self) -> &str {
        &self.name
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::MetaData
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        ctx.keyword_result(&self.name).annotate(self.value.clone())
    }

    fn to_json(&self) -> Value {
        self.value.clone()
    }
}

macro_rules! metadata_parser {
    ($fn_name:ident, $keyword:literal, $drafts:expr) => {
        pub(crate) fn $fn_name(
            value: &Value,
            _raw: &Map<String, Value>,
            _ctx: &ParseContext<'_>,
        ) -> SchemaResult<Box<dyn Keyword>> {
            Ok(MetadataKeyword::boxed($keyword, $drafts, value))
        }
    };
}

metadata_parser!(parse_title, "title", DraftSet::ALL);
metadata_parser!(parse_description, "description", DraftSet::ALL);
metadata_parser!(parse_default, "default", DraftSet::ALL);
metadata_parser!(parse_examples, "examples", DraftSet::FROM_DRAFT6);
metadata_parser!(parse_read_only, "readOnly", DraftSet::FROM_DRAFT7);
metadata_parser!(parse_write_only, "writeOnly", DraftSet::FROM_DRAFT7);
metadata_parser!(parse_deprecated, "deprecated", DraftSet::DRAFT2019_09);
metadata_parser!(parse_comment, "$comment", DraftSet::FROM_DRAFT7);
