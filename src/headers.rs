//! Header merging for sub-request dispatch.
//!
//! # Design Decisions
//! - Header names are case-insensitive; `HeaderMap` lowercases names on
//!   insertion, so keys differing only in case collapse to one header
//! - Override wins over outer for the same key
//! - Empty override values are skipped, never used to delete
//! - Invalid override names/values are skipped with a warning instead of
//!   failing the sub-request

use std::collections::BTreeMap;

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::HeaderMap;

/// Combine the outer call's headers with a sub-request's overrides.
///
/// Pure: the result is a new map, neither input is mutated.
pub fn merge_headers(outer: &HeaderMap, overrides: &BTreeMap<String, String>) -> HeaderMap {
    let mut merged = outer.clone();
    for (name, value) in overrides {
        if value.is_empty() {
            continue;
        }
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                merged.insert(name, value);
            }
            _ => {
                tracing::warn!(header = %name, "skipping invalid override header");
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outer() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("token", HeaderValue::from_static("outerToken"));
        headers
    }

    #[test]
    fn test_override_wins() {
        let mut overrides = BTreeMap::new();
        overrides.insert("token".to_string(), "innerToken".to_string());

        let merged = merge_headers(&outer(), &overrides);
        assert_eq!(merged.get("token").unwrap(), "innerToken");
        assert_eq!(merged.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn test_case_insensitive_keys() {
        let mut overrides = BTreeMap::new();
        overrides.insert("TOKEN".to_string(), "innerToken".to_string());

        let merged = merge_headers(&outer(), &overrides);
        // Same header, not a second entry.
        assert_eq!(merged.get("token").unwrap(), "innerToken");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_empty_override_value_is_skipped() {
        let mut overrides = BTreeMap::new();
        overrides.insert("token".to_string(), String::new());

        let merged = merge_headers(&outer(), &overrides);
        assert_eq!(merged.get("token").unwrap(), "outerToken");
    }

    #[test]
    fn test_inputs_untouched() {
        let base = outer();
        let mut overrides = BTreeMap::new();
        overrides.insert("extra".to_string(), "1".to_string());

        let merged = merge_headers(&base, &overrides);
        assert!(merged.contains_key("extra"));
        assert!(!base.contains_key("extra"));
    }

    #[test]
    fn test_invalid_override_name_is_skipped() {
        let mut overrides = BTreeMap::new();
        overrides.insert("bad header\n".to_string(), "1".to_string());

        let merged = merge_headers(&outer(), &overrides);
        assert_eq!(merged.len(), 2);
    }
}
