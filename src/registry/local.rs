//! Per-validation registry
//!
//! Anchors and embedded `$id` resources discovered while walking a schema
//! document are bound here, scoped to one validation call. Lookups during
//! `$ref` resolution consult this registry before the global one.

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::SchemaDocument;

/// Map from absolute URI (or `#anchor` key) to schema
#[derive(Debug, Default)]
pub struct LocalRegistry {
    schemas: HashMap<String, Arc<SchemaDocument>>,
}

impl LocalRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a schema under a URI
    ///
    /// A trailing `#` is trimmed so that `http://x/s` and `http://x/s#`
    /// address the same entry. Later bindings win, matching the last-write
    /// contract of the global store.
    pub fn register(&mut self, uri: impl Into<String>, schema: Arc<SchemaDocument>) {
        let uri = uri.into();
        let key = uri.trim_end_matches('#').to_string();
        self.schemas.insert(key, schema);
    }

    /// Look up a schema by URI
    pub fn get(&self, uri: &str) -> Option<Arc<SchemaDocument>> {
        self.schemas.get(uri.trim_end_matches('#')).cloned()
    }

    /// Whether a URI is bound
    pub fn contains(&self, uri: &str) -> bool {
        self.schemas.contains_key(uri.trim_end_matches('#'))
    }

    /// Number of bound URIs
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
