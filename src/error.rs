//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Error handling for the validation engine
//!
//! This module provides error types and result aliases for schema parsing
//! and loading. Evaluation-time failures are never errors: they are carried
//! as values in the result tree.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema engine error types
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Malformed schema JSON or a keyword rejected its value
    #[error("Schema parse error: {message}")]
    Parse { message: String },

    /// A format name was not recognized while format assertion is enabled
    #[error("Unknown format: {format}")]
    UnknownFormat { format: String },

    /// A downloaded document does not validate against its declared meta-schema
    #[error("Schema load error for '{uri}': {message}")]
    SchemaLoad {
        uri: String,
        message: String,
        /// Structural errors reported by the meta-schema validation
        errors: Vec<String>,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl SchemaError {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a parse error for a keyword that rejected its value
    pub fn keyword(name: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            message: format!("keyword '{}': {}", name, message.into()),
        }
    }

    /// Create an unknown format error
    pub fn unknown_format(format: impl Into<String>) -> Self {
        Self::UnknownFormat {
            format: format.into(),
        }
    }

    /// Create a schema load error
    pub fn schema_load(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaLoad {
            uri: uri.into(),
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Create a schema load error carrying the meta-schema validation errors
    pub fn schema_load_with_errors(
        uri: impl Into<String>,
        message: impl Into<String>,
        errors: Vec<String>,
    ) -> Self {
        Self::SchemaLoad {
            uri: uri.into(),
            message: message.into(),
            errors,
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for SchemaError {
    fn from(err: url::ParseError) -> Self {
        Self::Parse {
            message: format!("invalid URI: {}", err),
        }
    }
}

impl From<regex::Error> for SchemaError {
    fn from(err: regex::Error) -> Self {
        Self::Parse {
            message: format!("invalid regular expression: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = SchemaError::parse("bad value");
        assert!(matches!(error, SchemaError::Parse { .. }));

        let error = SchemaError::unknown_format("telephone");
        assert!(matches!(error, SchemaError::UnknownFormat { .. }));

        let error = SchemaError::schema_load("http://example.com/s", "unreachable");
        assert!(matches!(error, SchemaError::SchemaLoad { .. }));
    }

    #[test]
    fn test_keyword_error_message() {
        let error = SchemaError::keyword("minimum", "expected a number");
        assert_eq!(
            error.to_string(),
            "Schema parse error: keyword 'minimum': expected a number"
        );
    }

    #[test]
    fn test_load_error_carries_structural_errors() {
        let error = SchemaError::schema_load_with_errors(
            "http://example.com/s",
            "meta-schema validation failed",
            vec!["/type: expected string".to_string()],
        );
        match error {
            SchemaError::SchemaLoad { errors, .. } => assert_eq!(errors.len(), 1),
            _ => panic!("wrong variant"),
        }
    }
}
