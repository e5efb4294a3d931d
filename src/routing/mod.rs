//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (ordered stage lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: Health | Proxy | Asset
//!
//! Router Compilation (at startup):
//!     health path + reserved API prefix
//!     → Compile matchers
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Router compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins; unmatched requests are assets, never 404s

pub mod matcher;
pub mod router;

pub use router::{RouteKind, Router, HEALTH_PATH};
