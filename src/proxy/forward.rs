//! Upstream forwarding.
//!
//! # Responsibilities
//! - Resolve the target as gateway base + original path (prefix kept)
//! - Build the outgoing request from allow-listed headers only
//! - Reconstruct JSON bodies (see `body.rs`)
//! - Pass the upstream response through unchanged
//! - Translate transport failures and timeouts into `UpstreamUnavailable`
//!
//! # Design Decisions
//! - One attempt per request; retry policy belongs to the caller
//! - Bounded by a configurable timeout (0 disables it)
//! - Pooled hyper client shared by all requests

use std::error::Error as StdError;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header::HOST, HeaderValue, Request, Response, Uri},
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{EdgeConfig, UpstreamConfig};
use crate::http::request::request_id;
use crate::http::response::EdgeError;
use crate::proxy::body::prepare_body;
use crate::proxy::headers::{apply_forwarded, HeaderAllowList};

/// Forwards reserved-prefix requests to the gateway.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    base: String,
    allow_list: HeaderAllowList,
    max_body_size: usize,
    timeout: Option<Duration>,
    log_requests: bool,
}

impl Forwarder {
    pub fn new(config: &EdgeConfig) -> Self {
        let upstream: &UpstreamConfig = &config.upstream;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(upstream.connect_timeout_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            base: upstream.gateway_url.trim_end_matches('/').to_string(),
            allow_list: HeaderAllowList::default(),
            max_body_size: config.security.max_body_size,
            timeout: (upstream.request_timeout_secs > 0)
                .then(|| Duration::from_secs(upstream.request_timeout_secs)),
            log_requests: !config.is_production(),
        }
    }

    /// Target URI for an incoming path and query.
    pub fn target_uri(&self, original: &Uri) -> Result<Uri, EdgeError> {
        let path_and_query = original
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("{}{}", self.base, path_and_query)
            .parse()
            .map_err(|e| EdgeError::Internal(format!("invalid upstream target: {e}")))
    }

    /// Build the request sent upstream.
    pub async fn build_request(
        &self,
        request: Request<Body>,
        client: Option<SocketAddr>,
    ) -> Result<Request<Body>, EdgeError> {
        let (parts, body) = request.into_parts();
        let uri = self.target_uri(&parts.uri)?;

        let mut outgoing = Request::builder()
            .method(parts.method.clone())
            .uri(uri.clone())
            .body(Body::empty())
            .map_err(|e| EdgeError::Internal(format!("failed to build upstream request: {e}")))?;

        let headers = outgoing.headers_mut();
        self.allow_list.copy(&parts.headers, headers);
        apply_forwarded(&parts.headers, client, headers);

        // Host points at the gateway, not at the edge
        if let Some(authority) = uri.authority() {
            if let Ok(value) = HeaderValue::from_str(authority.as_str()) {
                headers.insert(HOST, value);
            }
        }

        let prepared = prepare_body(&parts.method, &parts.headers, body, self.max_body_size).await?;
        let body = prepared.into_body(outgoing.headers_mut());
        *outgoing.body_mut() = body;

        Ok(outgoing)
    }

    /// Forward a request and return the upstream response untouched.
    pub async fn forward(
        &self,
        request: Request<Body>,
        client: Option<SocketAddr>,
    ) -> Result<Response<Body>, EdgeError> {
        let request_id = request_id(&request).to_string();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let outgoing = self.build_request(request, client).await?;

        if self.log_requests {
            tracing::debug!(
                request_id = %request_id,
                "{} {} -> {}",
                method,
                path,
                outgoing.uri()
            );
        }

        let sent = self.client.request(outgoing);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, sent).await {
                Ok(result) => result.map_err(|e| error_chain(&e)),
                Err(_) => Err(format!(
                    "upstream did not respond within {}s",
                    limit.as_secs()
                )),
            },
            None => sent.await.map_err(|e| error_chain(&e)),
        };

        match result {
            Ok(response) => Ok(passthrough(response)),
            Err(detail) => {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    error = %detail,
                    "Upstream request failed"
                );
                Err(EdgeError::UpstreamUnavailable(detail))
            }
        }
    }
}

/// Re-box the upstream body; status and headers are left as received.
fn passthrough(response: Response<Incoming>) -> Response<Body> {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(body))
}

/// Render an error with its full source chain.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
