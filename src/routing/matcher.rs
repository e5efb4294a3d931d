//! Request matching logic.
//!
//! # Responsibilities
//! - Match exact paths (health endpoint)
//! - Match reserved path prefixes on segment boundaries
//! - Match request methods
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A trailing slash is tolerated on exact paths (`/health/`)
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::{Method, Request};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches a single path exactly.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let path = req.uri().path();
        path == self.path || path.strip_suffix('/') == Some(self.path.as_str())
    }
}

/// Matches a path prefix on a segment boundary.
///
/// `/api` matches `/api`, `/api/` and `/api/widgets`, but not `/apiary`.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. A trailing slash on the prefix is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        match req.uri().path().strip_prefix(&self.prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Matches a fixed set of methods.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    pub fn new(methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            methods: methods.into_iter().collect(),
        }
    }

    /// GET and HEAD, the methods a document or health probe is served for.
    pub fn read_only() -> Self {
        Self::new([Method::GET, Method::HEAD])
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.methods.contains(req.method())
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_exact_path_matcher() {
        let matcher = ExactPathMatcher::new("/health");

        assert!(matcher.matches(&request(Method::GET, "/health")));
        assert!(matcher.matches(&request(Method::GET, "/health/")));
        assert!(matcher.matches(&request(Method::GET, "/health?probe=1")));
        assert!(!matcher.matches(&request(Method::GET, "/healthz")));
        assert!(!matcher.matches(&request(Method::GET, "/health/deep")));
    }

    #[test]
    fn test_path_prefix_matcher() {
        let matcher = PathPrefixMatcher::new("/api");

        assert!(matcher.matches(&request(Method::GET, "http://example.com/api/v1")));
        assert!(matcher.matches(&request(Method::GET, "/api")));
        assert!(matcher.matches(&request(Method::POST, "/api/")));
        assert!(!matcher.matches(&request(Method::GET, "/apiary")));
        assert!(!matcher.matches(&request(Method::GET, "http://example.com/images")));
    }

    #[test]
    fn test_prefix_trailing_slash_is_ignored() {
        let matcher = PathPrefixMatcher::new("/api/");
        assert!(matcher.matches(&request(Method::GET, "/api/widgets")));
        assert!(!matcher.matches(&request(Method::GET, "/apix")));
    }

    #[test]
    fn test_and_matcher() {
        let matcher = AndMatcher::new(vec![
            Box::new(MethodMatcher::read_only()),
            Box::new(ExactPathMatcher::new("/health")),
        ]);

        assert!(matcher.matches(&request(Method::GET, "/health")));
        assert!(matcher.matches(&request(Method::HEAD, "/health")));
        assert!(!matcher.matches(&request(Method::POST, "/health")));
        assert!(!matcher.matches(&request(Method::GET, "/other")));
    }
}
