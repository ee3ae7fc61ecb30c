//! Bundled meta-schemas
//!
//! The four draft meta-schemas, the 2019-09 vocabulary sub-schemas, and the
//! JSON Patch schema, keyed by their canonical URIs. The registry seeds
//! itself from this list at construction.

use crate::draft::{DRAFT2019_09_URI, DRAFT4_URI, DRAFT6_URI, DRAFT7_URI};

/// Canonical URI prefix of the 2019-09 vocabulary sub-schemas
pub const DRAFT2019_09_META_PREFIX: &str = "https://json-schema.org/draft/2019-09/meta/";

/// URI of the bundled JSON Patch schema
pub const JSON_PATCH_URI: &str = "http://json.schemastore.org/json-patch";

/// Documents seeded into every registry, as `(URI, JSON text)`
pub const SEEDS: &[(&str, &str)] = &[
    (DRAFT4_URI, include_str!("metaschemas/draft-04.json")),
    (DRAFT6_URI, include_str!("metaschemas/draft-06.json")),
    (DRAFT7_URI, include_str!("metaschemas/draft-07.json")),
    (DRAFT2019_09_URI, include_str!("metaschemas/draft-2019-09.json")),
    (
        "https://json-schema.org/draft/2019-09/meta/core",
        include_str!("metaschemas/2019-09-core.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/applicator",
        include_str!("metaschemas/2019-09-applicator.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/validation",
        include_str!("metaschemas/2019-09-validation.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/meta-data",
        include_str!("metaschemas/2019-09-meta-data.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/format",
        include_str!("metaschemas/2019-09-format.json"),
    ),
    (
        "https://json-schema.org/draft/2019-09/meta/content",
        include_str!("metaschemas/2019-09-content.json"),
    ),
    (JSON_PATCH_URI, include_str!("metaschemas/json-patch.json")),
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_seeds_are_valid_json() {
        for (uri, text) in SEEDS {
            let parsed: Result<Value, _> = serde_json::from_str(text);
            assert!(parsed.is_ok(), "seed {} is not valid JSON", uri);
        }
    }

    #[test]
    fn test_seed_ids_match_uris() {
        for (uri, text) in SEEDS {
            let value: Value = serde_json::from_str(text).unwrap();
            if let Some(id) = value
                .get("$id")
                .or_else(|| value.get("id"))
                .and_then(Value::as_str)
            {
                assert_eq!(id.trim_end_matches('#'), *uri, "id mismatch for {}", uri);
            }
        }
    }
}
