//! Edge server for a single-page application.
//!
//! Serves the built bundle, forwards the reserved API prefix to the gateway,
//! and applies one security header policy to every response.

pub mod assets;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;

pub use config::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
