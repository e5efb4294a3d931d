//! Request classification.
//!
//! Stages are evaluated in a fixed order and the first match wins. Anything
//! no stage claims is an asset request, which the static server resolves or
//! hands to the SPA fallback.

use axum::body::Body;
use axum::http::Request;

use crate::routing::matcher::{AndMatcher, ExactPathMatcher, Matcher, MethodMatcher, PathPrefixMatcher};

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Terminal destination of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Liveness report.
    Health,
    /// Forwarded to the upstream gateway.
    Proxy,
    /// Static file, or the root document when no file matches.
    Asset,
}

/// Immutable classifier built once from configuration.
#[derive(Debug)]
pub struct Router {
    stages: Vec<(RouteKind, Box<dyn Matcher>)>,
}

impl Router {
    /// Build the classifier for the given reserved API prefix.
    pub fn new(api_prefix: &str) -> Self {
        let health: Box<dyn Matcher> = Box::new(AndMatcher::new(vec![
            Box::new(MethodMatcher::read_only()),
            Box::new(ExactPathMatcher::new(HEALTH_PATH)),
        ]));
        let proxy: Box<dyn Matcher> = Box::new(PathPrefixMatcher::new(api_prefix));

        Self {
            stages: vec![(RouteKind::Health, health), (RouteKind::Proxy, proxy)],
        }
    }

    /// Classify a request. Deterministic: same input, same destination.
    pub fn classify(&self, req: &Request<Body>) -> RouteKind {
        self.stages
            .iter()
            .find(|(_, matcher)| matcher.matches(req))
            .map(|(kind, _)| *kind)
            .unwrap_or(RouteKind::Asset)
    }
}
