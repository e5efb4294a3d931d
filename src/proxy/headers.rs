//! Headers crossing the proxy boundary.
//!
//! Only allow-listed headers are copied from the client request. Forwarded
//! metadata follows the `X-Forwarded-*` convention: an incoming chain is
//! extended, never duplicated, and each header is written exactly once.

use std::net::SocketAddr;

use axum::http::{
    header::{AUTHORIZATION, HOST},
    HeaderMap, HeaderName, HeaderValue,
};

pub const X_USERNAME: HeaderName = HeaderName::from_static("x-username");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_PORT: HeaderName = HeaderName::from_static("x-forwarded-port");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Fixed set of client headers copied onto the upstream request.
#[derive(Debug, Clone)]
pub struct HeaderAllowList {
    names: Vec<HeaderName>,
}

impl Default for HeaderAllowList {
    fn default() -> Self {
        Self {
            names: vec![X_USERNAME, AUTHORIZATION],
        }
    }
}

impl HeaderAllowList {
    pub fn names(&self) -> &[HeaderName] {
        &self.names
    }

    /// Copy listed headers present in `from`, overwriting any value in `to`.
    pub fn copy(&self, from: &HeaderMap, to: &mut HeaderMap) {
        for name in &self.names {
            if let Some(value) = from.get(name) {
                to.insert(name.clone(), value.clone());
            }
        }
    }
}

/// Join every incoming value of `name` with `value` into a single header value.
fn extend_chain(incoming: &HeaderMap, name: &HeaderName, value: &str) -> Option<HeaderValue> {
    let mut parts: Vec<&str> = incoming
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    parts.push(value);
    HeaderValue::from_str(&parts.join(",")).ok()
}

/// Port the client addressed, taken from its Host header.
fn client_port(incoming: &HeaderMap) -> &str {
    incoming
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|host| host.rsplit_once(':'))
        .map(|(_, port)| port)
        .filter(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or("80")
}

/// Write forwarded metadata describing the original client onto `to`.
pub fn apply_forwarded(incoming: &HeaderMap, client: Option<SocketAddr>, to: &mut HeaderMap) {
    if let Some(addr) = client {
        if let Some(value) = extend_chain(incoming, &X_FORWARDED_FOR, &addr.ip().to_string()) {
            to.insert(X_FORWARDED_FOR, value);
        }
    } else if let Some(value) = incoming.get(X_FORWARDED_FOR) {
        to.insert(X_FORWARDED_FOR, value.clone());
    }

    if let Some(value) = extend_chain(incoming, &X_FORWARDED_PORT, client_port(incoming)) {
        to.insert(X_FORWARDED_PORT, value);
    }

    // The edge itself only listens on plain HTTP
    if let Some(value) = extend_chain(incoming, &X_FORWARDED_PROTO, "http") {
        to.insert(X_FORWARDED_PROTO, value);
    }

    if let Some(host) = incoming.get(X_FORWARDED_HOST).or_else(|| incoming.get(HOST)) {
        to.insert(X_FORWARDED_HOST, host.clone());
    }
}
