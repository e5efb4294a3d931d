//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge.
//! All types derive Serde traits so they can be layered by the loader
//! (struct defaults, optional TOML file, environment variables).

use std::path::PathBuf;

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

/// Root configuration for the edge router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Upstream gateway the API prefix is forwarded to.
    pub upstream: UpstreamConfig,

    /// Security header flags and request limits.
    pub security: SecurityConfig,

    /// Built SPA bundle location and cache policy inputs.
    pub static_files: StaticFilesConfig,

    /// Deployment mode; controls error verbosity and log defaults.
    pub environment: RunMode,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl EdgeConfig {
    /// Whether the edge runs in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}

/// Deployment mode. Anything other than `production` behaves as development.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum RunMode {
    Production,
    Development(String),
}

impl RunMode {
    pub fn is_production(&self) -> bool {
        matches!(self, RunMode::Production)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunMode::Production => "production",
            RunMode::Development(name) => name,
        }
    }
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Development("development".to_string())
    }
}

impl From<String> for RunMode {
    fn from(value: String) -> Self {
        if value.trim() == "production" {
            RunMode::Production
        } else {
            RunMode::Development(value)
        }
    }
}

impl From<RunMode> for String {
    fn from(mode: RunMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host (e.g., "0.0.0.0").
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Upstream gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the gateway (e.g., "http://gateway-service:8081").
    pub gateway_url: String,

    /// Reserved path prefix whose traffic is proxied, kept on the upstream path.
    pub api_prefix: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total upstream request timeout in seconds (0 = unbounded).
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://gateway-service:8081".to_string(),
            api_prefix: "/api".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Emit Strict-Transport-Security. Only for HTTPS-terminated deployments.
    #[serde(deserialize_with = "flag")]
    pub hsts_enabled: bool,

    /// HSTS max-age in seconds (default: 180 days).
    pub hsts_max_age: u64,

    /// Emit Cross-Origin-Opener-Policy.
    #[serde(deserialize_with = "flag")]
    pub coop_enabled: bool,

    /// Emit Origin-Agent-Cluster.
    #[serde(deserialize_with = "flag")]
    pub origin_agent_cluster_enabled: bool,

    /// Maximum JSON body size buffered for reconstruction, in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            hsts_enabled: false,
            hsts_max_age: 15_552_000,
            coop_enabled: false,
            origin_agent_cluster_enabled: false,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Deployment flag: on only for `true`, off for any other value.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(value) => value,
        Raw::Text(value) => value == "true",
        Raw::Other(_) => false,
    })
}

/// Static bundle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory holding the built bundle.
    pub root: PathBuf,

    /// Root document served for client-side routes.
    pub index_file: String,

    /// Runtime configuration file that must never be cached.
    pub runtime_config_file: String,

    /// max-age for fingerprinted assets, in seconds.
    pub max_age_secs: u64,
}

impl StaticFilesConfig {
    /// Absolute-or-relative path of the root document.
    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("dist"),
            index_file: "index.html".to_string(),
            runtime_config_file: "config.json".to_string(),
            max_age_secs: 31_536_000, // 1 year
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter. When unset, `info` in production and `debug` otherwise.
    pub level: Option<String>,
}
