//! Cache directives for bundle files.
//!
//! HTML documents and the runtime configuration file must always be
//! revalidated; every other file in the bundle is fingerprinted by the build
//! and can be cached for a year.

use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

use axum::http::{HeaderMap, HeaderValue};
use axum::http::header::IF_NONE_MATCH;

use crate::config::StaticFilesConfig;

/// Directive for documents that must never be served from cache.
pub const NO_STORE: &str = "no-store, no-cache, must-revalidate";

/// Caching behavior for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRule {
    /// HTML and runtime configuration.
    Revalidate,
    /// Fingerprinted asset.
    Immutable { max_age_secs: u64 },
}

impl CacheRule {
    pub fn header_value(&self) -> HeaderValue {
        match self {
            CacheRule::Revalidate => HeaderValue::from_static(NO_STORE),
            CacheRule::Immutable { max_age_secs } => {
                HeaderValue::from_str(&format!("public, max-age={max_age_secs}, immutable"))
                    .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=31536000, immutable"))
            }
        }
    }
}

/// Maps file names to cache rules.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    runtime_config_file: String,
    max_age_secs: u64,
}

impl CachePolicy {
    pub fn new(config: &StaticFilesConfig) -> Self {
        Self {
            runtime_config_file: config.runtime_config_file.clone(),
            max_age_secs: config.max_age_secs,
        }
    }

    pub fn rule_for(&self, path: &Path) -> CacheRule {
        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
        let is_runtime_config = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == self.runtime_config_file);

        if is_html || is_runtime_config {
            CacheRule::Revalidate
        } else {
            CacheRule::Immutable {
                max_age_secs: self.max_age_secs,
            }
        }
    }
}

/// Weak validator derived from file size and modification time.
pub fn weak_etag(meta: &Metadata) -> Option<String> {
    let mtime = meta.modified().ok()?.duration_since(UNIX_EPOCH).ok()?;
    Some(format!("W/\"{:x}-{:x}\"", meta.len(), mtime.as_millis()))
}

/// Whether the request's `If-None-Match` matches `etag` (weak comparison).
pub fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    let strip = |tag: &str| tag.trim().trim_start_matches("W/").to_string();
    let expected = strip(etag);

    headers
        .get_all(IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|tag| tag.trim() == "*" || strip(tag) == expected)
}
