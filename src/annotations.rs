//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Inter-keyword annotation channel
//!
//! Keywords communicate within one schema object through typed annotations:
//! `if` tells `then`/`else` how its subschema fared, `contains` publishes
//! its match count for `minContains`/`maxContains`, and the property
//! applicators publish which keys they covered for `additionalProperties`.
//! A consumer whose producer did not run treats the check as not applicable.

use std::collections::BTreeSet;

/// Canonical annotation keys
pub mod keys {
    /// Written by `if`, read by `then` and `else`
    pub const IF_KEYWORD_VALID: &str = "ifKeywordValid";

    /// Written by `contains`, read by `minContains` and `maxContains`
    pub const CONTAINS_COUNT: &str = "containsCount";

    /// Keys covered by `properties`, read by `additionalProperties`
    pub const PROPERTIES_MATCHED: &str = "propertiesMatched";

    /// Keys covered by `patternProperties`, read by `additionalProperties`
    pub const PATTERN_PROPERTIES_MATCHED: &str = "patternPropertiesMatched";

    /// Tuple prefix length covered by `items`, read by `additionalItems`
    pub const ITEMS_APPLIED: &str = "itemsApplied";

    /// Set by the single-schema form of `items`: every element was covered
    pub const ITEMS_APPLIED_TO_ALL: &str = "itemsAppliedToAll";
}

/// Annotation payload
///
/// A closed sum over the value shapes the keyword protocol needs.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    /// Boolean flag
    Bool(bool),

    /// Count or index watermark
    Count(usize),

    /// Absolute URI
    Uri(String),

    /// Set of property names
    Keys(BTreeSet<String>),
}

impl AnnotationValue {
    /// Read as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read as a count
    pub fn as_count(&self) -> Option<usize> {
        match self {
            AnnotationValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Read as a URI
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            AnnotationValue::Uri(u) => Some(u),
            _ => None,
        }
    }

    /// Read as a key set
    pub fn as_keys(&self) -> Option<&BTreeSet<String>> {
        match self {
            AnnotationValue::Keys(keys) => Some(keys),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(AnnotationValue::Bool(true).as_bool(), Some(true));
        assert_eq!(AnnotationValue::Count(3).as_count(), Some(3));
        assert_eq!(AnnotationValue::Bool(true).as_count(), None);

        let mut keys = BTreeSet::new();
        keys.insert("a".to_string());
        let annotation = AnnotationValue::Keys(keys.clone());
        assert_eq!(annotation.as_keys(), Some(&keys));
    }
}
