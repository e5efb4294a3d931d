//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! struct defaults
//!     → optional TOML file (--config)
//!     → environment variables (PORT, GATEWAY_URL, NODE_ENV, ENABLE_*)
//!     → loader.rs (layer & deserialize)
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no component reads the environment itself
//! - All fields have defaults to allow zero-config container deployments
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::EdgeConfig;
pub use schema::ListenerConfig;
pub use schema::RunMode;
pub use schema::SecurityConfig;
pub use schema::StaticFilesConfig;
pub use schema::UpstreamConfig;
