//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Draft identification and keyword applicability
//!
//! This module contains the supported draft enumeration, the draft set used
//! by keywords to declare applicability, and the mapping between meta-schema
//! URIs and drafts.

use serde::{Deserialize, Serialize};

/// Meta-schema URI for draft 04
pub const DRAFT4_URI: &str = "http://json-schema.org/draft-04/schema";

/// Meta-schema URI for draft 06
pub const DRAFT6_URI: &str = "http://json-schema.org/draft-06/schema";

/// Meta-schema URI for draft 07
pub const DRAFT7_URI: &str = "http://json-schema.org/draft-07/schema";

/// Meta-schema URI for draft 2019-09
pub const DRAFT2019_09_URI: &str = "https://json-schema.org/draft/2019-09/schema";

/// JSON Schema draft
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Draft {
    /// Draft 04
    Draft4,

    /// Draft 06
    Draft6,

    /// Draft 07
    Draft7,

    /// Draft 2019-09
    Draft201909,
}

impl Draft {
    /// Resolve a `$schema` URI to a draft
    ///
    /// The comparison ignores a trailing `#` and the URI scheme, both of
    /// which vary across published schema documents.
    pub fn from_metaschema_uri(uri: &str) -> Option<Draft> {
        let trimmed = uri.trim_end_matches('#');
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);

        match without_scheme {
            "json-schema.org/draft-04/schema" => Some(Draft::Draft4),
            "json-schema.org/draft-06/schema" => Some(Draft::Draft6),
            "json-schema.org/draft-07/schema" => Some(Draft::Draft7),
            "json-schema.org/draft/2019-09/schema" => Some(Draft::Draft201909),
            _ => None,
        }
    }

    /// The canonical meta-schema URI for this draft
    pub fn metaschema_uri(&self) -> &'static str {
        match self {
            Draft::Draft4 => DRAFT4_URI,
            Draft::Draft6 => DRAFT6_URI,
            Draft::Draft7 => DRAFT7_URI,
            Draft::Draft201909 => DRAFT2019_09_URI,
        }
    }

    /// Name of the identifier keyword in this draft
    pub fn id_keyword(&self) -> &'static str {
        match self {
            Draft::Draft4 => "id",
            _ => "$id",
        }
    }
}

impl Default for Draft {
    fn default() -> Self {
        Draft::Draft201909
    }
}

impl std::fmt::Display for Draft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Draft::Draft4 => write!(f, "draft-04"),
            Draft::Draft6 => write!(f, "draft-06"),
            Draft::Draft7 => write!(f, "draft-07"),
            Draft::Draft201909 => write!(f, "2019-09"),
        }
    }
}

/// Set of drafts a keyword applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftSet(u8);

impl DraftSet {
    /// Empty set
    pub const NONE: DraftSet = DraftSet(0);

    /// Draft 04 only
    pub const DRAFT4: DraftSet = DraftSet(1);

    /// Draft 06 only
    pub const DRAFT6: DraftSet = DraftSet(1 << 1);

    /// Draft 07 only
    pub const DRAFT7: DraftSet = DraftSet(1 << 2);

    /// Draft 2019-09 only
    pub const DRAFT2019_09: DraftSet = DraftSet(1 << 3);

    /// All supported drafts
    pub const ALL: DraftSet = DraftSet(0b1111);

    /// Draft 06 and later
    pub const FROM_DRAFT6: DraftSet = DraftSet(0b1110);

    /// Draft 07 and later
    pub const FROM_DRAFT7: DraftSet = DraftSet(0b1100);

    /// Draft 07 and earlier
    pub const THROUGH_DRAFT7: DraftSet = DraftSet(0b0111);

    /// Union of two sets
    pub const fn union(self, other: DraftSet) -> DraftSet {
        DraftSet(self.0 | other.0)
    }

    /// Whether the set contains the given draft
    pub fn contains(&self, draft: Draft) -> bool {
        let bit = match draft {
            Draft::Draft4 => Self::DRAFT4.0,
            Draft::Draft6 => Self::DRAFT6.0,
            Draft::Draft7 => Self::DRAFT7.0,
            Draft::Draft201909 => Self::DRAFT2019_09.0,
        };
        self.0 & bit != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metaschema_uri_roundtrip() {
        for draft in [
            Draft::Draft4,
            Draft::Draft6,
            Draft::Draft7,
            Draft::Draft201909,
        ] {
            assert_eq!(Draft::from_metaschema_uri(draft.metaschema_uri()), Some(draft));
        }
    }

    #[test]
    fn test_metaschema_uri_fragment_and_scheme_tolerance() {
        assert_eq!(
            Draft::from_metaschema_uri("http://json-schema.org/draft-07/schema#"),
            Some(Draft::Draft7)
        );
        assert_eq!(
            Draft::from_metaschema_uri("https://json-schema.org/draft-07/schema"),
            Some(Draft::Draft7)
        );
        assert_eq!(Draft::from_metaschema_uri("http://example.com/custom"), None);
    }

    #[test]
    fn test_draft_set_membership() {
        assert!(DraftSet::ALL.contains(Draft::Draft4));
        assert!(DraftSet::FROM_DRAFT6.contains(Draft::Draft201909));
        assert!(!DraftSet::FROM_DRAFT6.contains(Draft::Draft4));
        assert!(DraftSet::THROUGH_DRAFT7.contains(Draft::Draft7));
        assert!(!DraftSet::THROUGH_DRAFT7.contains(Draft::Draft201909));
    }

    #[test]
    fn test_draft_set_union() {
        let set = DraftSet::DRAFT4.union(DraftSet::DRAFT2019_09);
        assert!(set.contains(Draft::Draft4));
        assert!(set.contains(Draft::Draft201909));
        assert!(!set.contains(Draft::Draft6));
    }

    #[test]
    fn test_default_draft() {
        assert_eq!(Draft::default(), Draft::Draft201909);
    }
}
