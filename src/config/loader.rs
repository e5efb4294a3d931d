//! Configuration loading from defaults, an optional TOML file and the environment.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::{Uncased, UncasedStr},
    Figment,
};
use thiserror::Error;

use crate::config::schema::EdgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables understood by the edge and the config keys they set.
///
/// The names match the ones deployments already export for the Node edge
/// this service replaces.
pub const ENV_KEYS: &[(&str, &str)] = &[
    ("HOST", "listener.host"),
    ("PORT", "listener.port"),
    ("GATEWAY_URL", "upstream.gateway_url"),
    ("API_PREFIX", "upstream.api_prefix"),
    ("UPSTREAM_CONNECT_TIMEOUT_SECS", "upstream.connect_timeout_secs"),
    ("UPSTREAM_TIMEOUT_SECS", "upstream.request_timeout_secs"),
    ("NODE_ENV", "environment"),
    ("ENABLE_HSTS", "security.hsts_enabled"),
    ("ENABLE_COOP", "security.coop_enabled"),
    ("ENABLE_ORIGIN_AGENT_CLUSTER", "security.origin_agent_cluster_enabled"),
    ("MAX_BODY_SIZE", "security.max_body_size"),
    ("STATIC_DIR", "static_files.root"),
    ("LOG_LEVEL", "logging.level"),
];

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("parse error: {0}")]
    Parse(#[from] Box<figment::Error>),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Config key for an environment variable name.
fn key_for(name: &UncasedStr) -> Option<&'static str> {
    ENV_KEYS
        .iter()
        .find(|(var, _)| name.as_str().eq_ignore_ascii_case(var))
        .map(|(_, path)| *path)
}

/// Whether a known variable holds a non-blank value.
fn is_set(name: &UncasedStr) -> bool {
    ENV_KEYS
        .iter()
        .find(|(var, _)| name.as_str().eq_ignore_ascii_case(var))
        .and_then(|(var, _)| std::env::var(var).ok())
        .is_some_and(|value| !value.trim().is_empty())
}

/// Environment provider restricted to [`ENV_KEYS`], remapped onto nested keys.
///
/// Empty values count as unset, so `PORT=` keeps the default port.
fn environment() -> Env {
    let names: Vec<&str> = ENV_KEYS.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).filter(is_set).map(|name| {
        key_for(name)
            .map(Uncased::from)
            .unwrap_or_else(|| Uncased::from(name.as_str()))
    })
}

/// Load and validate configuration.
///
/// Layers, lowest priority first: struct defaults, the TOML file at `path`
/// (when given), then environment variables.
pub fn load_config(path: Option<&Path>) -> Result<EdgeConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(EdgeConfig::default()));

    if let Some(path) = path {
        if !path.is_file() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: EdgeConfig = figment
        .merge(environment())
        .extract()
        .map_err(Box::new)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
