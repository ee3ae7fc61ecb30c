//! Process-wide schema registry
//!
//! A read-mostly store from absolute URI to parsed schema, seeded with the
//! four meta-schemas, the 2019-09 vocabulary sub-schemas, and the JSON
//! Patch schema. Cache misses fall through to the caller-supplied download
//! hook; fetched documents are checked against their declared meta-schema
//! before being cached. Readers run concurrently; writers serialize behind
//! the lock, and a double-download race resolves last-write-wins.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use url::Url;

use crate::config::ValidationOptions;
use crate::error::{SchemaError, SchemaResult};
use crate::output::OutputFormat;
use crate::schema::{metaschema, SchemaDocument};

static GLOBAL: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();

/// Process-wide schema store
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<SchemaDocument>>>,
}

impl SchemaRegistry {
    /// Create a fresh registry seeded with the bundled meta-schemas
    ///
    /// Callers needing isolation construct their own registry and inject it
    /// into the validator instead of using the process singleton.
    pub fn new() -> Arc<Self> {
        let registry = Arc::new(Self {
            schemas: RwLock::new(HashMap::new()),
        });
        registry.seed();
        registry
    }

    /// The process-wide registry
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(Self::new))
    }

    fn seed(&self) {
        let options = ValidationOptions::default();
        for (uri, text) in metaschema::SEEDS {
            let value: Value = serde_json::from_str(text)
                .expect("bundled meta-schema is valid JSON");
            let document_path = Url::parse(uri).ok();
            let document = SchemaDocument::parse_rooted(&value, document_path, &options)
                .expect("bundled meta-schema parses");
            self.register(*uri, document);
        }
        tracing::debug!(count = metaschema::SEEDS.len(), "seeded schema registry");
    }

    /// Look up a schema; a trailing `#` on the URI is ignored
    pub fn get(&self, uri: &str) -> Option<Arc<SchemaDocument>> {
        let key = uri.trim_end_matches('#');
        self.schemas
            .read()
            .expect("registry lock poisoned")
            .get(key)
            .cloned()
    }

    /// Bind a schema under a URI; later bindings win
    pub fn register(&self, uri: impl Into<String>, schema: Arc<SchemaDocument>) {
        let uri = uri.into();
        let key = uri.trim_end_matches('#').to_string();
        self.schemas
            .write()
            .expect("registry lock poisoned")
            .insert(key, schema);
    }

    /// Remove a binding; returns whether it existed
    pub fn unregister(&self, uri: &str) -> bool {
        self.schemas
            .write()
            .expect("registry lock poisoned")
            .remove(uri.trim_end_matches('#'))
            .is_some()
    }

    /// Drop every binding and re-seed the meta-schemas
    pub fn clear(&self) {
        self.schemas
            .write()
            .expect("registry lock poisoned")
            .clear();
        self.seed();
    }

    /// Number of bound URIs
    pub fn len(&self) -> usize {
        self.schemas.read().expect("registry lock poisoned").len()
    }

    /// Whether the registry holds no bindings
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a URI, consulting the cache and then the download hook
    ///
    /// With `refresh_user_resolver` set, the hook is consulted first and the
    /// cache only serves as a fallback.
    pub fn resolve(
        self: &Arc<Self>,
        uri: &str,
        options: &ValidationOptions,
    ) -> SchemaResult<Option<Arc<SchemaDocument>>> {
        let key = uri.trim_end_matches('#');

        if !options.refresh_user_resolver {
            if let Some(found) = self.get(key) {
                return Ok(Some(found));
            }
        }

        let Some(download) = &options.download else {
            return Ok(self.get(key));
        };
        let Some(text) = download.as_ref()(key) else {
            return Ok(self.get(key));
        };

        let loaded = self.load_document(key, &text, options)?;
        Ok(Some(loaded))
    }

    fn load_document(
        self: &Arc<Self>,
        uri: &str,
        text: &str,
        options: &ValidationOptions,
    ) -> SchemaResult<Arc<SchemaDocument>> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SchemaError::schema_load(uri, format!("invalid JSON: {}", e)))?;

        self.check_against_metaschema(uri, &value)?;

        let document_path = Url::parse(uri).ok();
        let document =
            SchemaDocument::parse_rooted_with_registry(&value, document_path, options, Some(self))?;
        self.register(uri, Arc::clone(&document));
        tracing::debug!(uri, "cached downloaded schema");
        Ok(document)
    }

    /// Validate a fetched document against its declared meta-schema
    fn check_against_metaschema(self: &Arc<Self>, uri: &str, value: &Value) -> SchemaResult<()> {
        let Some(declared) = value.get("$schema").and_then(Value::as_str) else {
            return Ok(());
        };
        let Some(metaschema) = self.get(declared) else {
            return Ok(());
        };

        let check_options = ValidationOptions::default().with_output_format(OutputFormat::Basic);
        let result = crate::schema::validator::run_validation(
            &metaschema,
            value,
            check_options,
            Arc::clone(self),
        );

        if result.is_valid {
            return Ok(());
        }

        let errors: Vec<String> = result
            .failures()
            .into_iter()
            .map(|failure| {
                format!(
                    "{}: {}",
                    failure.instance_location,
                    failure.error().unwrap_or("invalid")
                )
            })
            .collect();
        Err(SchemaError::schema_load_with_errors(
            uri,
            format!("document does not validate against '{}'", declared),
            errors,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{DRAFT2019_09_URI, DRAFT4_URI, DRAFT6_URI, DRAFT7_URI};
    use serde_json::json;

    #[test]
    fn test_seeded_with_metaschemas() {
        let registry = SchemaRegistry::new();
        for uri in [DRAFT4_URI, DRAFT6_URI, DRAFT7_URI, DRAFT2019_09_URI] {
            assert!(registry.get(uri).is_some(), "missing meta-schema {}", uri);
        }
        assert!(registry
            .get("https://json-schema.org/draft/2019-09/meta/validation")
            .is_some());
        assert!(registry.get("http://json.schemastore.org/json-patch").is_some());
    }

    #[test]
    fn test_get_trims_trailing_hash() {
        let registry = SchemaRegistry::new();
        assert!(registry
            .get("http://json-schema.org/draft-07/schema#")
            .is_some());
    }

    #[test]
    fn test_register_unregister_clear() {
        let registry = SchemaRegistry::new();
        let seeded = registry.len();

        let options = ValidationOptions::default();
        let doc = SchemaDocument::parse_rooted(&json!({"type": "string"}), None, &options).unwrap();
        registry.register("http://example.com/s", doc);
        assert_eq!(registry.len(), seeded + 1);

        assert!(registry.unregister("http://example.com/s#"));
        assert!(!registry.unregister("http://example.com/s"));

        registry.clear();
        assert_eq!(registry.len(), seeded);
    }

    #[test]
    fn test_resolve_downloads_and_caches() {
        let registry = SchemaRegistry::new();
        let options = ValidationOptions::default()
            .with_download(|uri| match uri {
                "http://example.com/remote" => Some(r#"{"type": "integer"}"#.to_string()),
                _ => None,
            });

        let resolved = registry
            .resolve("http://example.com/remote", &options)
            .unwrap();
        assert!(resolved.is_some());
        // cached for subsequent lookups without the hook
        assert!(registry.get("http://example.com/remote").is_some());
    }

    #[test]
    fn test_resolve_unknown_without_hook() {
        let registry = SchemaRegistry::new();
        let options = ValidationOptions::default();
        let resolved = registry.resolve("http://example.com/missing", &options).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_load_rejects_document_failing_its_metaschema() {
        let registry = SchemaRegistry::new();
        // draft-07 meta-schema requires `type` to be a string or array
        let options = ValidationOptions::default().with_download(|uri| match uri {
            "http://example.com/broken" => Some(
                r#"{"$schema": "http://json-schema.org/draft-07/schema#", "type": 12}"#.to_string(),
            ),
            _ => None,
        });

        let outcome = registry.resolve("http://example.com/broken", &options);
        assert!(matches!(outcome, Err(SchemaError::SchemaLoad { .. })));
    }
}
