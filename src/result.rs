//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Validation result tree
//!
//! Each keyword evaluation produces one node; subschema evaluations hang off
//! it as nested nodes. The tree mirrors the evaluation and is collapsed into
//! the requested output format by the formatter.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::pointer::JsonPointer;
use crate::utils::render_template;

/// One node of the validation result tree
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Keyword that produced this node; `None` for schema-level composites
    pub keyword: Option<String>,

    /// Path into the root instance
    pub instance_location: JsonPointer,

    /// Path of keywords traversed from the validation root
    pub relative_location: JsonPointer,

    /// Absolute schema location, when the enclosing document has a known URI
    pub absolute_location: Option<String>,

    /// Verdict for this node
    pub is_valid: bool,

    /// Rendered failure message
    pub error_message: Option<String>,

    /// Tokens available to the message template and to callers
    pub additional_info: BTreeMap<String, Value>,

    /// Annotation payload produced on success
    pub annotation: Option<Value>,

    /// Results of subschema and per-keyword evaluations
    pub nested: Vec<ValidationResult>,
}

impl ValidationResult {
    /// Create a passing node with the given locations
    pub fn new(
        keyword: Option<String>,
        instance_location: JsonPointer,
        relative_location: JsonPointer,
        absolute_location: Option<String>,
    ) -> Self {
        Self {
            keyword,
            instance_location,
            relative_location,
            absolute_location,
            is_valid: true,
            error_message: None,
            additional_info: BTreeMap::new(),
            annotation: None,
            nested: Vec::new(),
        }
    }

    /// Attach a template token
    pub fn info(mut self, token: &str, value: Value) -> Self {
        self.additional_info.insert(token.to_string(), value);
        self
    }

    /// Mark the node failed and render its message from a template
    ///
    /// Each `{{token}}` resolves against `additional_info`; unknown tokens
    /// stay literal.
    pub fn fail(mut self, template: &str) -> Self {
        self.is_valid = false;
        self.error_message = Some(render_template(template, &self.additional_info));
        self
    }

    /// Mark the node failed with a pre-rendered message
    pub fn fail_message(mut self, message: impl Into<String>) -> Self {
        self.is_valid = false;
        self.error_message = Some(message.into());
        self
    }

    /// Attach an annotation payload
    pub fn annotate(mut self, value: Value) -> Self {
        self.annotation = Some(value);
        self
    }

    /// Attach nested results without changing this node's verdict
    pub fn with_nested(mut self, nested: Vec<ValidationResult>) -> Self {
        self.nested = nested;
        self
    }

    /// Append one nested result
    pub fn push(&mut self, child: ValidationResult) {
        self.nested.push(child);
    }

    /// The failure message, if any
    pub fn error(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Number of failing leaf nodes in the subtree
    pub fn error_count(&self) -> usize {
        let own = usize::from(!self.is_valid && self.error_message.is_some());
        own + self.nested.iter().map(|n| n.error_count()).sum::<usize>()
    }

    /// Depth-first iteration over failing nodes that carry a message
    pub fn failures(&self) -> Vec<&ValidationResult> {
        let mut collected = Vec::new();
        self.collect_failures(&mut collected);
        collected
    }

    fn collect_failures<'a>(&'a self, into: &mut Vec<&'a ValidationResult>) {
        if !self.is_valid && self.error_message.is_some() {
            into.push(self);
        }
        for nested in &self.nested {
            nested.collect_failures(into);
        }
    }
}
