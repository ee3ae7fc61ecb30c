//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Configuration for the validation engine
//!
//! This module provides the engine-visible options: draft selection, format
//! and content assertion switches, output format, the error-reporting policy
//! hook, and the download callback used during reference resolution.

use std::fmt;
use std::sync::Arc;

use crate::draft::Draft;
use crate::output::OutputFormat;
use crate::pointer::JsonPointer;

/// Caller-supplied fetcher for schemas referenced by absolute URI
///
/// Returns the raw document text, or `None` when the URI cannot be served.
pub type DownloadFn = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Policy hook controlling whether failing combinator branches include
/// their nested errors
pub type ReportChildErrorsFn = dyn Fn(&str, &JsonPointer) -> bool + Send + Sync;

/// Validation engine options
#[derive(Clone)]
pub struct ValidationOptions {
    /// Draft assumed when a schema declares no known `$schema`
    pub default_draft: Draft,

    /// When false, `format` is annotation-only
    pub validate_format: bool,

    /// When false, parsing a schema with an unknown format fails
    pub allow_unknown_formats: bool,

    /// When true, the content keywords assert instead of annotating
    pub validate_content: bool,

    /// Output format; `Flag` enables short-circuit evaluation
    pub output_format: OutputFormat,

    /// When true, the download hook is consulted even on cache hits
    pub refresh_user_resolver: bool,

    /// Caller-supplied HTTP fetcher
    pub download: Option<Arc<DownloadFn>>,

    /// Per-keyword policy for including child errors of failing branches
    pub report_child_errors: Option<Arc<ReportChildErrorsFn>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            default_draft: Draft::default(),
            validate_format: false,
            allow_unknown_formats: true,
            validate_content: false,
            output_format: OutputFormat::default(),
            refresh_user_resolver: false,
            download: None,
            report_child_errors: None,
        }
    }
}

impl ValidationOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback draft
    pub fn with_default_draft(mut self, draft: Draft) -> Self {
        self.default_draft = draft;
        self
    }

    /// Enable or disable format assertion
    pub fn with_validate_format(mut self, validate_format: bool) -> Self {
        self.validate_format = validate_format;
        self
    }

    /// Allow or reject unknown format names
    pub fn with_allow_unknown_formats(mut self, allow: bool) -> Self {
        self.allow_unknown_formats = allow;
        self
    }

    /// Enable or disable content assertion
    pub fn with_validate_content(mut self, validate_content: bool) -> Self {
        self.validate_content = validate_content;
        self
    }

    /// Select the output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Install a download hook
    pub fn with_download<F>(mut self, download: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.download = Some(Arc::new(download));
        self
    }

    /// Install the child-error reporting policy
    pub fn with_report_child_errors<F>(mut self, policy: F) -> Self
    where
        F: Fn(&str, &JsonPointer) -> bool + Send + Sync + 'static,
    {
        self.report_child_errors = Some(Arc::new(policy));
        self
    }

    /// Re-invoke the download hook on every lookup
    pub fn with_refresh_user_resolver(mut self, refresh: bool) -> Self {
        self.refresh_user_resolver = refresh;
        self
    }

    /// Whether a failing branch of the given keyword should report its
    /// nested errors
    pub fn should_report_child_errors(&self, keyword: &str, location: &JsonPointer) -> bool {
        match &self.report_child_errors {
            Some(policy) => policy.as_ref()(keyword, location),
            None => true,
        }
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("default_draft", &self.default_draft)
            .field("validate_format", &self.validate_format)
            .field("allow_unknown_formats", &self.allow_unknown_formats)
            .field("validate_content", &self.validate_content)
            .field("output_format", &self.output_format)
            .field("refresh_user_resolver", &self.refresh_user_resolver)
            .field("download", &self.download.as_ref().map(|_| "<fn>"))
            .field(
                "report_child_errors",
                &self.report_child_errors.as_ref().map(|_| "<fn>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ValidationOptions::default();
        assert_eq!(options.default_draft, Draft::Draft201909);
        assert!(!options.validate_format);
        assert!(options.allow_unknown_formats);
        assert!(!options.validate_content);
        assert_eq!(options.output_format, OutputFormat::Detailed);
        assert!(options.download.is_none());
    }

    #[test]
    fn test_builder() {
        let options = ValidationOptions::new()
            .with_default_draft(Draft::Draft7)
            .with_validate_format(true)
            .with_output_format(OutputFormat::Flag)
            .with_download(|_| None);

        assert_eq!(options.default_draft, Draft::Draft7);
        assert!(options.validate_format);
        assert_eq!(options.output_format, OutputFormat::Flag);
        assert!(options.download.is_some());
    }

    #[test]
    fn test_report_child_errors_defaults_to_true() {
        let options = ValidationOptions::default();
        assert!(options.should_report_child_errors("anyOf", &JsonPointer::root()));

        let options = options.with_report_child_errors(|keyword, _| keyword != "anyOf");
        assert!(!options.should_report_child_errors("anyOf", &JsonPointer::root()));
        assert!(options.should_report_child_errors("oneOf", &JsonPointer::root()));
    }
}
