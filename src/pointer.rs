//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! JSON Pointer support
//!
//! This module provides the pointer type used to locate positions in both
//! the instance and the schema. Segments are stored unescaped; RFC 6901
//! escaping is applied on display and removed on parse.

use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};

/// Ordered sequence of unescaped path segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The root pointer (empty segment list)
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a pointer from RFC 6901 syntax
    ///
    /// Accepts the empty string, `/a/b` style pointers, and the URI fragment
    /// form with a leading `#`.
    pub fn parse(input: &str) -> SchemaResult<Self> {
        let input = input.strip_prefix('#').unwrap_or(input);
        if input.is_empty() {
            return Ok(Self::root());
        }
        if !input.starts_with('/') {
            return Err(SchemaError::parse(format!(
                "JSON Pointer must start with '/': '{}'",
                input
            )));
        }

        let segments = input[1..]
            .split('/')
            .map(|seg| seg.replace("~1", "/").replace("~0", "~"))
            .collect();

        Ok(Self { segments })
    }

    /// Produce a new pointer with one segment appended
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Produce a new pointer with several segments appended
    pub fn append_all<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut segments = self.segments.clone();
        segments.extend(extra.into_iter().map(Into::into));
        Self { segments }
    }

    /// The unescaped segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the root pointer
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walk the pointer through a value
    ///
    /// Out-of-bounds indices and missing keys yield `None`.
    pub fn resolve<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        let mut current = value;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => {
                    let index: usize = segment.parse().ok()?;
                    items.get(index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

impl std::fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

impl From<&[&str]> for JsonPointer {
    fn from(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_display_roundtrip() {
        let pointer = JsonPointer::parse("/a/b/0").unwrap();
        assert_eq!(pointer.segments(), &["a", "b", "0"]);
        assert_eq!(pointer.to_string(), "/a/b/0");

        let pointer = JsonPointer::parse("").unwrap();
        assert!(pointer.is_root());
        assert_eq!(pointer.to_string(), "");
    }

    #[test]
    fn test_parse_fragment_form() {
        let pointer = JsonPointer::parse("#/$defs/n").unwrap();
        assert_eq!(pointer.segments(), &["$defs", "n"]);
    }

    #[test]
    fn test_escaping() {
        let pointer = JsonPointer::parse("/a~1b/c~0d").unwrap();
        assert_eq!(pointer.segments(), &["a/b", "c~d"]);
        assert_eq!(pointer.to_string(), "/a~1b/c~0d");
    }

    #[test]
    fn test_rejects_missing_leading_slash() {
        assert!(JsonPointer::parse("a/b").is_err());
    }

    #[test]
    fn test_append() {
        let pointer = JsonPointer::root().append("properties").append("name");
        assert_eq!(pointer.to_string(), "/properties/name");

        let appended = pointer.append_all(["items", "0"]);
        assert_eq!(appended.to_string(), "/properties/name/items/0");
        // the original is untouched
        assert_eq!(pointer.to_string(), "/properties/name");
    }

    #[test]
    fn test_resolve() {
        let value = json!({"a": {"b": [10, 20, 30]}});
        let pointer = JsonPointer::parse("/a/b/1").unwrap();
        assert_eq!(pointer.resolve(&value), Some(&json!(20)));

        let missing = JsonPointer::parse("/a/x").unwrap();
        assert_eq!(missing.resolve(&value), None);

        let out_of_bounds = JsonPointer::parse("/a/b/9").unwrap();
        assert_eq!(out_of_bounds.resolve(&value), None);
    }

    #[test]
    fn test_resolve_root() {
        let value = json!({"a": 1});
        assert_eq!(JsonPointer::root().resolve(&value), Some(&value));
    }
}
