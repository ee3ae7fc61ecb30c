//! Validator entry points
//!
//! A `Validator` compiles a schema once and evaluates any number of
//! instances against it. The free functions cover the one-shot case.

use serde_json::Value;
use std::sync::Arc;

use crate::config::ValidationOptions;
use crate::context::{ValidationContext, ValidationScope};
use crate::error::SchemaResult;
use crate::output::{OutputFormat, OutputFormatter};
use crate::registry::SchemaRegistry;
use crate::result::ValidationResult;
use crate::schema::SchemaDocument;

/// Compiled validator for one schema
pub struct Validator {
    root: Arc<SchemaDocument>,
    options: ValidationOptions,
    registry: Arc<SchemaRegistry>,
}

impl Validator {
    /// Compile a schema with default options against the global registry
    pub fn new(schema: &Value) -> SchemaResult<Self> {
        Self::with_options(schema, ValidationOptions::default())
    }

    /// Compile a schema with explicit options against the global registry
    pub fn with_options(schema: &Value, options: ValidationOptions) -> SchemaResult<Self> {
        Self::with_registry(schema, options, SchemaRegistry::global())
    }

    /// Compile a schema against an injected registry
    pub fn with_registry(
        schema: &Value,
        options: ValidationOptions,
        registry: Arc<SchemaRegistry>,
    ) -> SchemaResult<Self> {
        let root =
            SchemaDocument::parse_rooted_with_registry(schema, None, &options, Some(&registry))?;
        Ok(Self {
            root,
            options,
            registry,
        })
    }

    /// The compiled schema
    pub fn schema(&self) -> &Arc<SchemaDocument> {
        &self.root
    }

    /// Evaluate an instance, producing the full result tree
    pub fn validate(&self, instance: &Value) -> ValidationResult {
        run_validation(
            &self.root,
            instance,
            self.options.clone(),
            Arc::clone(&self.registry),
        )
    }

    /// Evaluate an instance, reporting only the verdict
    ///
    /// Runs in `Flag` mode so combinators and the keyword loop may
    /// short-circuit.
    pub fn is_valid(&self, instance: &Value) -> bool {
        let options = self.options.clone().with_output_format(OutputFormat::Flag);
        run_validation(&self.root, instance, options, Arc::clone(&self.registry)).is_valid
    }

    /// Evaluate an instance and render the configured output format
    pub fn validate_to_output(&self, instance: &Value) -> Value {
        let result = self.validate(instance);
        OutputFormatter::new(self.options.output_format).render(&result)
    }
}

/// Drive one validation call
pub(crate) fn run_validation(
    root: &Arc<SchemaDocument>,
    instance: &Value,
    options: ValidationOptions,
    registry: Arc<SchemaRegistry>,
) -> ValidationResult {
    let scope = ValidationScope::new(options, registry);

    // bind the document's ids and anchors for reference lookups
    let base = root.id().or(root.document_path()).cloned();
    scope.adopt_document(root, base.as_ref());

    let mut ctx = ValidationContext::new(instance, root.document_path().cloned(), scope);
    ctx.document = Some(Arc::clone(root));
    root.validate_with(&mut ctx)
}

/// Validate an instance against a schema in one call
pub fn validate(schema: &Value, instance: &Value) -> SchemaResult<ValidationResult> {
    Ok(Validator::new(schema)?.validate(instance))
}

/// Check an instance against a schema in one call
pub fn is_valid(schema: &Value, instance: &Value) -> SchemaResult<bool> {
    Ok(Validator::new(schema)?.is_valid(instance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_shot_helpers() {
        let schema = json!({"type": "integer"});
        assert!(is_valid(&schema, &json!(5)).unwrap());
        assert!(!is_valid(&schema, &json!("five")).unwrap());

        let result = validate(&schema, &json!("five")).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn test_validator_reuse() {
        let validator = Validator::new(&json!({"minimum": 10})).unwrap();
        assert!(validator.is_valid(&json!(10)));
        assert!(validator.is_valid(&json!(11)));
        assert!(!validator.is_valid(&json!(9)));
    }

    #[test]
    fn test_flag_output_matches_detailed_verdict() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["a"]
        });
        let validator = Validator::new(&schema).unwrap();

        for instance in [json!({"a": "x"}), json!({"a": 1}), json!({}), json!(3)] {
            let detailed = validator.validate(&instance);
            assert_eq!(validator.is_valid(&instance), detailed.is_valid);
        }
    }

    #[test]
    fn test_validate_to_output_flag() {
        let schema = json!({"type": "integer"});
        let validator = Validator::with_options(
            &schema,
            ValidationOptions::default().with_output_format(OutputFormat::Flag),
        )
        .unwrap();

        assert_eq!(validator.validate_to_output(&json!(1)), json!({"valid": true}));
        assert_eq!(
            validator.validate_to_output(&json!("x")),
            json!({"valid": false})
        );
    }
}
