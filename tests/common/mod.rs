//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Map, Value};
use spa_edge::config::EdgeConfig;
use spa_edge::http::HttpServer;
use spa_edge::lifecycle::Shutdown;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const INDEX_HTML: &str = "<!doctype html><html><body><div id=\"root\"></div></body></html>";
pub const CONFIG_JSON: &str = r#"{"apiBase":"/api"}"#;
pub const APP_JS: &str = "console.log('app');";

/// Gateway stand-in.
///
/// - `/api/status/{code}` answers with that status, body `teapot`, and
///   headers an upstream might set (`x-upstream`, HSTS, COOP)
/// - `/api/slow` answers after three seconds
/// - anything else echoes method, path, query, headers and body as JSON
async fn gateway(request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let path = parts.uri.path().to_string();

    if let Some(code) = path.strip_prefix("/api/status/") {
        let status = code
            .parse::<u16>()
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .unwrap_or(StatusCode::OK);
        return (
            status,
            [
                ("x-upstream", "gateway"),
                ("strict-transport-security", "max-age=60"),
                ("cross-origin-opener-policy", "same-origin"),
            ],
            "teapot",
        )
            .into_response();
    }

    if path == "/api/slow" {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }

    let headers: Map<String, Value> = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect();

    Json(json!({
        "method": parts.method.as_str(),
        "path": path,
        "query": parts.uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&bytes),
    }))
    .into_response()
}

/// Start the gateway stand-in on an ephemeral port.
pub async fn start_gateway() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(gateway);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// An address nothing listens on.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Write a minimal built bundle.
pub fn write_bundle() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "index.html", INDEX_HTML);
    write_file(dir.path(), "config.json", CONFIG_JSON);
    write_file(dir.path(), "assets/app-3f9a1c.js", APP_JS);
    dir
}

fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Config pointing at `gateway` and serving `bundle`.
pub fn test_config(gateway: SocketAddr, bundle: &Path) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.upstream.gateway_url = format!("http://{gateway}");
    config.upstream.request_timeout_secs = 1;
    config.static_files.root = bundle.to_path_buf();
    config
}

/// Start the edge. Keep the returned [`Shutdown`] alive for the test's duration.
pub async fn start_edge(config: EdgeConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
