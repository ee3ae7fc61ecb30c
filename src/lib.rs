//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! JSON Schema validation engine
//!
//! This crate evaluates in-memory JSON instances against JSON Schema
//! documents for drafts 04, 06, 07, and 2019-09, producing a verdict
//! together with structured annotations and diagnostics locating each
//! failure in both the schema and the instance.
//!
//! ```
//! use serde_json::json;
//!
//! let schema = json!({"type": "integer", "minimum": 0, "exclusiveMaximum": 10});
//! assert!(schema_validation::is_valid(&schema, &json!(5)).unwrap());
//! assert!(!schema_validation::is_valid(&schema, &json!(10)).unwrap());
//! ```

pub mod annotations;
pub mod config;
pub mod context;
pub mod draft;
pub mod error;
pub mod format;
pub mod keyword;
pub mod output;
pub mod pointer;
pub mod registry;
pub mod result;
pub mod schema;
pub mod utils;

// Re-export main types
pub use config::ValidationOptions;
pub use draft::{Draft, DraftSet};
pub use error::{SchemaError, SchemaResult};
pub use output::{OutputFormat, OutputFormatter};
pub use pointer::JsonPointer;
pub use registry::SchemaRegistry;
pub use result::ValidationResult;
pub use schema::{is_valid, validate, SchemaDocument, Validator};

/// Engine version
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const ENGINE_NAME: &str = "schema-validation";
