//! HTTP cache control module
//!
//! Provides `ETag` generation, conditional request handling and the
//! `Cache-Control` policies used for static files.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a quoted `ETag` from the file content
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Whether the client's `If-None-Match` header matches `etag`
///
/// Accepts a single tag, a comma separated list, weak tags (`W/"..."`)
/// and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
        })
    })
}

/// Cache policy attached to a static response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public cache with the given max-age in seconds
    Public(u32),
    /// Always revalidate. Used for the SPA index document so new builds
    /// are picked up immediately.
    NoCache,
}

impl CachePolicy {
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Public(3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_etag() {
        let etag = generate_etag(b"hello world");
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag, generate_etag(b"hello world"));
        assert_ne!(etag, generate_etag(b"hello there"));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_cache_policy() {
        assert_eq!(CachePolicy::default().to_header_value(), "public, max-age=3600");
        assert_eq!(CachePolicy::NoCache.to_header_value(), "no-cache");
    }
}
