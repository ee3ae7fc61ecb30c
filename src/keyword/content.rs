//! Content keywords
//!
//! `contentEncoding`, `contentMediaType`, and `contentSchema` describe how
//! to read a string instance. They are annotation-only unless content
//! assertion is enabled in the options.

use base64::Engine;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use url::Url;

use crate::context::ValidationContext;
use crate::draft::DraftSet;
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::{Keyword, ParseContext, Vocabulary};
use crate::registry::LocalRegistry;
use crate::result::ValidationResult;
use crate::schema::SchemaDocument;

fn decode_base64(input: &str) -> Option<Vec<u8>> {
    base64::engine::general_purpose::STANDARD.decode(input).ok()
}

/// `contentEncoding`: the string decodes under the named encoding
#[derive(Debug)]
pub struct ContentEncodingKeyword {
    encoding: String,
}

impl Keyword for ContentEncodingKeyword {
    fn name(&self) -> &str {
        "contentEncoding"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::FROM_DRAFT7
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Content
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx.keyword_result("contentEncoding").annotate(json!(self.encoding));

        if !ctx.options().validate_content {
            return result;
        }
        let Some(text) = instance.as_str() else {
            return result;
        };

        let decodes = match self.encoding.as_str() {
            "base64" => decode_base64(text).is_some(),
            // unrecognized encodings stay annotations
            _ => true,
        };
        if decodes {
            result
        } else {
            result
                .info("encoding", json!(self.encoding))
                .fail("String is not valid {{encoding}}")
        }
    }

    fn to_json(&self) -> Value {
        json!(self.encoding)
    }
}

pub(crate) fn parse_content_encoding(
    value: &Value,
    _raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let encoding = value
        .as_str()
        .ok_or_else(|| SchemaError::keyword("contentEncoding", "expected a string"))?;
    Ok(Box::new(ContentEncodingKeyword {
        encoding: encoding.to_string(),
    }))
}

/// `contentMediaType`: the (decoded) string parses as the named media type
#[derive(Debug)]
pub struct ContentMediaTypeKeyword {
    media_type: String,
    base64_encoded: bool,
}

impl Keyword for ContentMediaTypeKeyword {
    fn name(&self) -> &str {
        "contentMediaType"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::FROM_DRAFT7
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Content
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx
            .keyword_result("contentMediaType")
            .annotate(json!(self.media_type));

        if !ctx.options().validate_content {
            return result;
        }
        let Some(text) = instance.as_str() else {
            return result;
        };

        if self.media_type != "application/json" {
            return result;
        }

        let parses = if self.base64_encoded {
            decode_base64(text)
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .map(|decoded| serde_json::from_str::<Value>(&decoded).is_ok())
                .unwrap_or(false)
        } else {
            serde_json::from_str::<Value>(text).is_ok()
        };

        if parses {
            result
        } else {
            result
                .info("mediaType", json!(self.media_type))
                .fail("String is not valid {{mediaType}}")
        }
    }

    fn to_json(&self) -> Value {
        json!(self.media_type)
    }
}

pub(crate) fn parse_content_media_type(
    value: &Value,
    raw: &Map<String, Value>,
    _ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    let media_type = value
        .as_str()
        .ok_or_else(|| SchemaError::keyword("contentMediaType", "expected a string"))?;
    Ok(Box::new(ContentMediaTypeKeyword {
        media_type: media_type.to_string(),
        base64_encoded: raw.get("contentEncoding").and_then(Value::as_str) == Some("base64"),
    }))
}

/// `contentSchema`: schema applied to the decoded document
#[derive(Debug)]
pub struct ContentSchemaKeyword {
    schema: Arc<SchemaDocument>,
    base64_encoded: bool,
}

impl Keyword for ContentSchemaKeyword {
    fn name(&self) -> &str {
        "contentSchema"
    }

    fn supported_drafts(&self) -> DraftSet {
        DraftSet::DRAFT2019_09
    }

    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::Content
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let instance = ctx.instance;
        let result = ctx
            .keyword_result("contentSchema")
            .annotate(self.schema.to_json());

        if !ctx.options().validate_content {
            return result;
        }
        let Some(text) = instance.as_str() else {
            return result;
        };

        let decoded = if self.base64_encoded {
            decode_base64(text).and_then(|bytes| String::from_utf8(bytes).ok())
        } else {
            Some(text.to_string())
        };
        let Some(document) = decoded.and_then(|d| serde_json::from_str::<Value>(&d).ok()) else {
            return result.fail_message("Content could not be decoded for schema validation");
        };

        let mut child = ctx.child(&document, &["contentSchema"], None);
        let subresult = self.schema.validate_with(&mut child);
        let valid = subresult.is_valid;

        let mut result = result.with_nested(vec![subresult]);
        if !valid {
            result = result.fail_message("Decoded content does not match the schema");
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

pub(crate) fn parse_content_schema(
    value: &Value,
    raw: &Map<String, Value>,
    ctx: &ParseContext<'_>,
) -> SchemaResult<Box<dyn Keyword>> {
    Ok(Box::new(ContentSchemaKeyword {
        schema: SchemaDocument::parse_nested(value, ctx)?,
        base64_encoded: raw.get("contentEncoding").and_then(Value::as_str) == Some("base64"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationOptions;
    use crate::context::ValidationScope;
    use crate::registry::SchemaRegistry;

    fn ctx_with<'i>(instance: &'i Value, options: ValidationOptions) -> ValidationContext<'i> {
        let scope = ValidationScope::new(options, SchemaRegistry::global());
        ValidationContext::new(instance, None, scope)
    }

    #[test]
    fn test_annotation_only_by_default() {
        let keyword = ContentEncodingKeyword {
            encoding: "base64".to_string(),
        };
        let instance = json!("!!! not base64 !!!");
        let mut ctx = ctx_with(&instance, ValidationOptions::default());

        let result = keyword.validate(&mut ctx);
        assert!(result.is_valid);
        assert_eq!(result.annotation, Some(json!("base64")));
    }

    #[test]
    fn test_base64_assertion() {
        let keyword = ContentEncodingKeyword {
            encoding: "base64".to_string(),
        };
        let options = ValidationOptions::default().with_validate_content(true);

        let instance = json!("aGVsbG8=");
        let mut ctx = ctx_with(&instance, options.clone());
        assert!(keyword.validate(&mut ctx).is_valid);

        let instance = json!("!!! not base64 !!!");
        let mut ctx = ctx_with(&instance, options);
        assert!(!keyword.validate(&mut ctx).is_valid);
    }

    #[test]
    fn test_media_type_assertion() {
        let keyword = ContentMediaTypeKeyword {
            media_type: "application/json".to_string(),
            base64_encoded: false,
        };
        let options = ValidationOptions::default().with_validate_content(true);

        let instance = json!("{\"a\": 1}");
        let mut ctx = ctx_with(&instance, options.clone());
        assert!(keyword.validate(&mut ctx).is_valid);

        let instance = json!("{not json");
        let mut ctx = ctx_with(&instance, options);
        assert!(!keyword.validate(&mut ctx).is_valid);
    }

    #[test]
    fn test_content_schema_assertion() {
        let options = ValidationOptions::default().with_validate_content(true);
        let parse_options = ValidationOptions::default();
        let parse_ctx = ParseContext::new(crate::draft::Draft::Draft201909, None, &parse_options);
        let keyword = ContentSchemaKeyword {
            schema: SchemaDocument::parse_nested(&json!({"type": "object"}), &parse_ctx).unwrap(),
            base64_encoded: false,
        };

        let instance = json!("{\"a\": 1}");
        let mut ctx = ctx_with(&instance, options.clone());
        assert!(keyword.validate(&mut ctx).is_valid);

        let instance = json!("[1, 2]");
        let mut ctx = ctx_with(&instance, options);
        assert!(!keyword.validate(&mut ctx).is_valid);
    }
}
