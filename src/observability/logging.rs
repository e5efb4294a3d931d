//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Pick the output format from the run mode
//! - Resolve the log level from config, overridable via `RUST_LOG`
//!
//! # Design Decisions
//! - JSON format for production, human-readable format for development
//! - Development defaults to `debug` so proxied requests are visible

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

use crate::config::EdgeConfig;

/// Level used when neither `RUST_LOG` nor `logging.level` is set.
pub fn default_level(config: &EdgeConfig) -> &str {
    match &config.logging.level {
        Some(level) => level.as_str(),
        None if config.is_production() => "info",
        None => "debug",
    }
}

/// Filter directives for this crate and the HTTP middleware.
pub fn default_directives(config: &EdgeConfig) -> String {
    let level = default_level(config);
    format!("spa_edge={level},tower_http={level}")
}

/// Install the global subscriber.
pub fn init_logging(config: &EdgeConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    let production = config.is_production();
    let json = production.then(|| fmt::layer().json());
    let pretty = (!production).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
}
