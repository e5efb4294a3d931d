//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server from validated configuration
//! - Bind the listener and begin accepting traffic
//! - Wire OS signals to graceful shutdown
//!
//! # Design Decisions
//! - Fail fast: a bind failure is fatal
//! - Listener binds last (traffic only when ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::EdgeConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals::spawn_signal_handler, Shutdown};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the edge until a termination signal arrives.
pub async fn start(config: EdgeConfig) -> Result<(), StartupError> {
    let address = config.listener.bind_address();

    tracing::info!(
        environment = config.environment.as_str(),
        gateway_url = %config.upstream.gateway_url,
        api_prefix = %config.upstream.api_prefix,
        hsts = config.security.hsts_enabled,
        coop = config.security.coop_enabled,
        origin_agent_cluster = config.security.origin_agent_cluster_enabled,
        "Configuration loaded"
    );

    let server = HttpServer::new(config);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    server.run(listener, receiver).await?;
    Ok(())
}
