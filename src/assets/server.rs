//! Static bundle serving with SPA fallback.
//!
//! # Responsibilities
//! - Resolve request paths inside the bundle directory
//! - Serve files with the cache directive for their type
//! - Answer matching `If-None-Match` with 304
//! - Serve the root document when nothing matches
//!
//! # Design Decisions
//! - Traversal outside the root is treated as "no file" and falls back
//! - GET requests never get a 404; other methods do
//! - A missing root document is a server fault, not a client one

use std::path::{Component, Path, PathBuf};

use axum::{
    body::Body,
    http::{
        header::{CACHE_CONTROL, ETAG},
        HeaderValue, Method, Request, Response, StatusCode,
    },
};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::assets::cache::{etag_matches, weak_etag, CachePolicy};
use crate::config::StaticFilesConfig;
use crate::http::response::EdgeError;

/// Serves the built SPA bundle.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
    index: PathBuf,
    index_file: String,
    policy: CachePolicy,
}

/// Decode and normalize a URI path into a path relative to the bundle root.
///
/// Returns `None` for undecodable paths and for any `..` component.
pub fn normalize_path(uri_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(uri_path).decode_utf8().ok()?;
    let trimmed = decoded.trim_matches('/');

    let mut normalized = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::Normal(segment) => normalized.push(segment),
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }
    Some(normalized)
}

impl StaticAssets {
    pub fn new(config: &StaticFilesConfig) -> Self {
        Self {
            root: config.root.clone(),
            index: config.index_path(),
            index_file: config.index_file.clone(),
            policy: CachePolicy::new(config),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the file a URI path refers to. Directories resolve to their index.
    pub async fn resolve(&self, uri_path: &str) -> Option<PathBuf> {
        let candidate = self.root.join(normalize_path(uri_path)?);
        let meta = tokio::fs::metadata(&candidate).await.ok()?;

        if meta.is_file() {
            return Some(candidate);
        }
        if meta.is_dir() {
            let index = candidate.join(&self.index_file);
            if tokio::fs::metadata(&index).await.ok()?.is_file() {
                return Some(index);
            }
        }
        None
    }

    /// Serve a static file, or the root document when no file matches.
    pub async fn serve(&self, request: Request<Body>) -> Result<Response<Body>, EdgeError> {
        if !matches!(*request.method(), Method::GET | Method::HEAD) {
            return Err(EdgeError::NotFound {
                method: request.method().clone(),
                path: request.uri().path().to_string(),
            });
        }

        match self.resolve(request.uri().path()).await {
            Some(path) => self.serve_file(&path, request).await,
            None => self.fallback(request).await,
        }
    }

    /// Serve the root document for a client-side route.
    pub async fn fallback(&self, request: Request<Body>) -> Result<Response<Body>, EdgeError> {
        let is_file = tokio::fs::metadata(&self.index)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(EdgeError::Internal(format!(
                "root document not found: {}",
                self.index.display()
            )));
        }

        tracing::trace!(path = %request.uri().path(), "Serving root document");
        self.serve_file(&self.index, request).await
    }

    async fn serve_file(
        &self,
        path: &Path,
        request: Request<Body>,
    ) -> Result<Response<Body>, EdgeError> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            EdgeError::Internal(format!("failed to stat {}: {e}", path.display()))
        })?;
        let cache_control = self.policy.rule_for(path).header_value();
        let etag = weak_etag(&meta).and_then(|tag| HeaderValue::from_str(&tag).ok());

        if let Some(etag) = &etag {
            if etag_matches(request.headers(), etag.to_str().unwrap_or_default()) {
                return Response::builder()
                    .status(StatusCode::NOT_MODIFIED)
                    .header(ETAG, etag.clone())
                    .header(CACHE_CONTROL, cache_control)
                    .body(Body::empty())
                    .map_err(|e| EdgeError::Internal(e.to_string()));
            }
        }

        let mut response = match ServeFile::new(path).oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        };

        if response.status().is_success() || response.status() == StatusCode::NOT_MODIFIED {
            let headers = response.headers_mut();
            headers.insert(CACHE_CONTROL, cache_control);
            if let Some(etag) = etag {
                headers.insert(ETAG, etag);
            }
        }
        Ok(response)
    }
}
