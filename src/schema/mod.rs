//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Schema documents and the evaluation engine
//!
//! This module provides the parsed schema form, the recursive evaluation
//! driver, the embedded meta-schemas, and the validator entry points.

pub mod core;
pub mod metaschema;
pub mod validator;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use self::core::SchemaDocument;
pub use validator::{is_valid, validate, Validator};
