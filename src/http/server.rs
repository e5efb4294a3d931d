//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the edge handler and middleware
//! - Classify each request (health, proxy, asset) and dispatch it
//! - Forward API requests to the gateway
//! - Serve the static bundle with SPA fallback
//! - Render every failure as JSON
//! - Bind server to listener with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, trace::TraceLayer,
};

use crate::assets::StaticAssets;
use crate::config::EdgeConfig;
use crate::health::HealthReport;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::http::response::{ErrorRenderer, PanicResponder};
use crate::proxy::Forwarder;
use crate::routing::{RouteKind, Router as EdgeRouter};
use crate::security::{build_security_headers, security_headers_middleware};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EdgeConfig>,
    pub router: Arc<EdgeRouter>,
    pub forwarder: Forwarder,
    pub assets: Arc<StaticAssets>,
    pub errors: ErrorRenderer,
}

impl AppState {
    pub fn new(config: Arc<EdgeConfig>) -> Self {
        Self {
            router: Arc::new(EdgeRouter::new(&config.upstream.api_prefix)),
            forwarder: Forwarder::new(&config),
            assets: Arc::new(StaticAssets::new(&config.static_files)),
            errors: ErrorRenderer::new(&config.environment),
            config,
        }
    }
}

/// HTTP server for the edge.
pub struct HttpServer {
    router: Router,
    config: Arc<EdgeConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: EdgeConfig) -> Self {
        let config = Arc::new(config);

        if !config.static_files.root.is_dir() {
            tracing::warn!(
                static_dir = %config.static_files.root.display(),
                "Static bundle directory not found; every page request will fail until it exists"
            );
        }

        let state = AppState::new(config.clone());
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost first: request ID, tracing, request ID echo,
    /// security headers, panic conversion, compression, then the handler.
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        let policy = build_security_headers(&config.security, &config.upstream);
        let panics = PanicResponder::new(state.errors);

        Router::new()
            .fallback(edge_handler)
            .with_state(state)
            .layer(CompressionLayer::new())
            .layer(CatchPanicLayer::custom(panics))
            .layer(middleware::from_fn_with_state(policy, security_headers_middleware))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            gateway_url = %self.config.upstream.gateway_url,
            static_dir = %self.config.static_files.root.display(),
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }
}

/// Single entry point: classify, then hand off to the matching stage.
async fn edge_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let result = match state.router.classify(&request) {
        RouteKind::Health => Ok(HealthReport::new(&state.config.upstream.gateway_url).into_response()),
        RouteKind::Proxy => state.forwarder.forward(request, client).await,
        RouteKind::Asset => state.assets.serve(request).await,
    };

    result.unwrap_or_else(|err| state.errors.render(&err))
}
