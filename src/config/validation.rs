//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream URL is something the forwarder can reach
//! - Validate value ranges (port, body limit)
//! - Detect a reserved prefix that would shadow the health path or everything
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::EdgeConfig;
use crate::routing::HEALTH_PATH;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("gateway_url '{url}' is not a valid URL: {reason}")]
    InvalidGatewayUrl { url: String, reason: String },

    #[error("gateway_url '{0}' must use the http scheme (terminate TLS in front of the gateway)")]
    UnsupportedScheme(String),

    #[error("listener port must be non-zero")]
    ZeroPort,

    #[error("api_prefix '{0}' must start with '/' and must not be '/' or the health path")]
    InvalidApiPrefix(String),

    #[error("max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.upstream.gateway_url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::UnsupportedScheme(
                    config.upstream.gateway_url.clone(),
                ));
            } else if url.host_str().is_none() {
                errors.push(ValidationError::InvalidGatewayUrl {
                    url: config.upstream.gateway_url.clone(),
                    reason: "missing host".to_string(),
                });
            }
        }
        Err(e) => errors.push(ValidationError::InvalidGatewayUrl {
            url: config.upstream.gateway_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let prefix = config.upstream.api_prefix.trim_end_matches('/');
    if !config.upstream.api_prefix.starts_with('/') || prefix.is_empty() || prefix == HEALTH_PATH {
        errors.push(ValidationError::InvalidApiPrefix(
            config.upstream.api_prefix.clone(),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
