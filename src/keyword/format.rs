//! The `format` keyword
//!
//! Delegates to the named-validator registry. Assertion behavior is
//! configurable: with `validate_format` off the keyword only annotates, and
//! a format unknown in the active draft always downgrades to an annotation.

use serde_json::{json, Map, Value};

use crate::context::ValidationContext;
use crate::draft::Draft;
use crate::error::{SchemaError, SchemaResult};
use crate::format as formats;
use crate::keyword::{Keyword, ParseContext, Vocabulary};
use crate::result::ValidationResult;

/// `format`: semantic check on string instances
#[derive(Debug)]
pub struct FormatKeyword {
    format: String,
    draft: Draft,
}

impl Keyword for FormatKeyword {
    fn name(&self) -> &str {
        "format"
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Format
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result("format").annotate(json!(self.format));

        if !ctx.options().validate_format {
            return result;
        }
        let Some(text) = instance.as_str() else {
            return result;
        };

        match formats::lookup(&self.format) {
            Some(validator) if validator.supported_drafts().contains(self.draft) => {
                if validator.check(text) {
                    result
                } else {
                    result
                        .info("format", json!(self.format))
                        .fail("String does not conform to format {{format}}")
                }
            }
            // unknown in this draft: annotation only
            _ => result,
        }
    }

    fn to_json(&self) -> Value {
        json!(self.format)
    }
}

pub(crate) fn parse_format(
    value: &Value,
    _raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let format = value
        .as_str()
        .ok_or_else(|| SchemaError::keyword("format", "expected a string"))?;

    if ctx.options.validate_format
        && !ctx.options.allow_unknown_formats
        && !formats::is_known(format)
    {
        return Err(SchemaError::unknown_format(format));
    }

    Ok(Box::new(FormatKeyword {
        format: format.to_string(),
        draft: ctx.draft,
    }))
}
