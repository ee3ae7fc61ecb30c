//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Output assembly
//!
//! Collapses the nested result tree into one of the three 2019-09 output
//! formats. `Flag` reduces to a single boolean, `Basic` inlines every
//! failing node into a flat list, `Detailed` serializes the tree with
//! annotations on passing nodes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::result::ValidationResult;

/// Output format selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single boolean; combinators may short-circuit
    Flag,

    /// Flat list of failing keywords
    Basic,

    /// Full result tree with annotations
    Detailed,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Detailed
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Flag => write!(f, "flag"),
            OutputFormat::Basic => write!(f, "basic"),
            OutputFormat::Detailed => write!(f, "detailed"),
        }
    }
}

/// Output formatter
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Create a formatter for the given format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a result tree into the serialized output structure
    pub fn render(&self, result: &ValidationResult) -> Value {
        match self.format {
            OutputFormat::Flag => json!({ "valid": result.is_valid }),
            OutputFormat::Basic => self.render_basic(result),
            OutputFormat::Detailed => self.render_detailed(result),
        }
    }

    fn render_basic(&self, result: &ValidationResult) -> Value {
        let errors: Vec<Value> = result
            .failures()
            .into_iter()
            .map(|failure| {
                let mut unit = Map::new();
                unit.insert(
                    "keywordLocation".to_string(),
                    json!(failure.relative_location.to_string()),
                );
                if let Some(absolute) = &failure.absolute_location {
                    unit.insert("absoluteKeywordLocation".to_string(), json!(absolute));
                }
                unit.insert(
                    "instanceLocation".to_string(),
                    json!(failure.instance_location.to_string()),
                );
                if let Some(error) = failure.error() {
                    unit.insert("error".to_string(), json!(error));
                }
                Value::Object(unit)
            })
            .collect();

        json!({
            "valid": result.is_valid,
            "errors": errors,
        })
    }

    fn render_detailed(&self, result: &ValidationResult) -> Value {
        let mut unit = Map::new();
        unit.insert("valid".to_string(), json!(result.is_valid));
        unit.insert(
            "keywordLocation".to_string(),
            json!(result.relative_location.to_string()),
        );
        if let Some(absolute) = &result.absolute_location {
            unit.insert("absoluteKeywordLocation".to_string(), json!(absolute));
        }
        unit.insert(
            "instanceLocation".to_string(),
            json!(result.instance_location.to_string()),
        );

        if let Some(error) = result.error() {
            unit.insert("error".to_string(), json!(error));
        }
        if result.is_valid {
            if let Some(annotation) = &result.annotation {
                unit.insert("annotation".to_string(), annotation.clone());
            }
        }

        if !result.nested.is_empty() {
            let children: Vec<Value> = result
                .nested
                .iter()
                .map(|nested| self.render_detailed(nested))
                .collect();
            let key = if result.is_valid { "annotations" } else { "errors" };
            unit.insert(key.to_string(), Value::Array(children));
        }

        Value::Object(unit)
    }
}
