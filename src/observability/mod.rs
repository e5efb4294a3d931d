//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → http::request spans (method, path, x-request-id)
//!
//! Consumers:
//!     → Container log collection (stdout)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing in production
//! - Request ID flows through every log line of a request

pub mod logging;

pub use logging::init_logging;
