//! Security response headers.
//!
//! # Responsibilities
//! - Compute the Content-Security-Policy for the bundled app
//! - Add the baseline hardening headers to every response
//! - Add HSTS, COOP and Origin-Agent-Cluster only when enabled
//! - Strip disabled headers even when an inner layer or the upstream set them
//!
//! # Design Decisions
//! - Headers are computed once at startup and shared via `Arc`
//! - The policy is authoritative: its values overwrite inner ones
//! - Disabled means removed, not merely left out

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
            X_CONTENT_TYPE_OPTIONS, X_DNS_PREFETCH_CONTROL, X_FRAME_OPTIONS, X_XSS_PROTECTION,
        },
        HeaderMap, HeaderName, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use url::Url;

use crate::config::{SecurityConfig, UpstreamConfig};

pub const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");
pub const CROSS_ORIGIN_EMBEDDER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-embedder-policy");
pub const CROSS_ORIGIN_RESOURCE_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-resource-policy");
pub const ORIGIN_AGENT_CLUSTER: HeaderName = HeaderName::from_static("origin-agent-cluster");
pub const X_PERMITTED_CROSS_DOMAIN_POLICIES: HeaderName =
    HeaderName::from_static("x-permitted-cross-domain-policies");
pub const X_DOWNLOAD_OPTIONS: HeaderName = HeaderName::from_static("x-download-options");
pub const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");

/// Headers to set and headers to strip on every response.
#[derive(Debug, Clone)]
pub struct SecurityHeaderPolicy {
    set: HeaderMap,
    remove: Vec<HeaderName>,
}

impl SecurityHeaderPolicy {
    /// Headers written onto every response.
    pub fn headers(&self) -> &HeaderMap {
        &self.set
    }

    /// Headers removed from every response.
    pub fn removed(&self) -> &[HeaderName] {
        &self.remove
    }

    /// Apply the policy to a response header map.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for name in &self.remove {
            headers.remove(name);
        }
        for (name, value) in self.set.iter() {
            headers.insert(name.clone(), value.clone());
        }
    }
}

/// Origin of the upstream gateway as it appears in `connect-src`.
fn gateway_origin(gateway_url: &str) -> String {
    match Url::parse(gateway_url) {
        Ok(url) => url.origin().ascii_serialization(),
        Err(_) => gateway_url.trim_end_matches('/').to_string(),
    }
}

/// Content-Security-Policy value for the bundled app.
///
/// Script sources allow inline code and eval, which the bundle needs at runtime.
pub fn content_security_policy(gateway_url: &str) -> String {
    let connect_src = format!("connect-src 'self' {}", gateway_origin(gateway_url));
    [
        "default-src 'self'",
        "script-src 'self' 'unsafe-inline' 'unsafe-eval'",
        "style-src 'self' 'unsafe-inline'",
        "img-src 'self' data: https:",
        connect_src.as_str(),
        "font-src 'self' data:",
        "object-src 'none'",
        "media-src 'self'",
        "frame-src 'none'",
    ]
    .join(";")
}

/// Build the header policy from configuration.
pub fn build_security_headers(
    security: &SecurityConfig,
    upstream: &UpstreamConfig,
) -> Arc<SecurityHeaderPolicy> {
    let mut set = HeaderMap::new();
    let mut remove = vec![CROSS_ORIGIN_EMBEDDER_POLICY, X_POWERED_BY];

    if let Ok(value) = HeaderValue::from_str(&content_security_policy(&upstream.gateway_url)) {
        set.insert(CONTENT_SECURITY_POLICY, value);
    }

    set.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    set.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    set.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    set.insert(X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off"));
    set.insert(X_PERMITTED_CROSS_DOMAIN_POLICIES, HeaderValue::from_static("none"));
    set.insert(X_DOWNLOAD_OPTIONS, HeaderValue::from_static("noopen"));
    set.insert(CROSS_ORIGIN_RESOURCE_POLICY, HeaderValue::from_static("same-origin"));
    // Turns the legacy XSS auditor off
    set.insert(X_XSS_PROTECTION, HeaderValue::from_static("0"));

    // HSTS only makes sense behind HTTPS termination
    if security.hsts_enabled {
        let hsts = format!("max-age={}; includeSubDomains", security.hsts_max_age);
        if let Ok(value) = HeaderValue::from_str(&hsts) {
            set.insert(STRICT_TRANSPORT_SECURITY, value);
        }
    } else {
        remove.push(STRICT_TRANSPORT_SECURITY);
    }

    if security.coop_enabled {
        set.insert(CROSS_ORIGIN_OPENER_POLICY, HeaderValue::from_static("same-origin"));
    } else {
        remove.push(CROSS_ORIGIN_OPENER_POLICY);
    }

    if security.origin_agent_cluster_enabled {
        set.insert(ORIGIN_AGENT_CLUSTER, HeaderValue::from_static("?1"));
    } else {
        remove.push(ORIGIN_AGENT_CLUSTER);
    }

    Arc::new(SecurityHeaderPolicy { set, remove })
}

/// Middleware applying the policy to every response.
///
/// Sits outside panic conversion so health, proxied, static, fallback and
/// error responses are all covered.
pub async fn security_headers_middleware(
    State(policy): State<Arc<SecurityHeaderPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    policy.apply(response.headers_mut());
    response
}
