//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health
//!     → endpoint.rs (status, service name, configured gateway, timestamp)
//!     → 200 JSON
//! ```
//!
//! # Design Decisions
//! - No dependency on upstream reachability
//! - No side effects; safe for aggressive probing

pub mod endpoint;

pub use endpoint::HealthReport;
