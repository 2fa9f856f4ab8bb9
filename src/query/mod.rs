//! Query normalization module
//!
//! Maps raw input text to the canonical cache key and enforces the minimum
//! length gate that every lookup passes before touching the cache or network.

use serde::{Deserialize, Serialize};

/// Minimum trimmed length a query needs before providers are asked
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Canonical form of a query: trimmed, then lowercased
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// True iff the trimmed query has at least `min_len` characters
pub fn is_eligible(raw: &str, min_len: usize) -> bool {
    raw.trim().chars().count() >= min_len
}

/// A query that passed the eligibility gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupQuery {
    /// Original input as typed
    pub raw: String,
    /// Normalized text, used both as cache key and provider query
    pub key: String,
}

impl LookupQuery {
    /// Parse raw input, returning `None` when it is too short to look up
    pub fn parse(raw: &str, min_len: usize) -> Option<Self> {
        if !is_eligible(raw, min_len) {
            return None;
        }

        Some(Self {
            raw: raw.to_string(),
            key: normalize(raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Paris "), "paris");
        assert_eq!(normalize("NEW York"), "new york");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_eligibility_gate() {
        assert!(!is_eligible("a", 2));
        assert!(is_eligible(" ab ", 2));
        assert!(!is_eligible("   ", 1));
        assert!(is_eligible("", 0));
    }

    #[test]
    fn test_eligibility_counts_characters() {
        // Two characters, four bytes
        assert!(is_eligible("éé", 2));
        assert!(!is_eligible("é", 2));
    }

    #[test]
    fn test_parse() {
        let query = LookupQuery::parse(" Par ", DEFAULT_MIN_QUERY_LEN).unwrap();
        assert_eq!(query.raw, " Par ");
        assert_eq!(query.key, "par");

        assert!(LookupQuery::parse("p", DEFAULT_MIN_QUERY_LEN).is_none());
    }
}
