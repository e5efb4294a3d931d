//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response (any route):
//!     → headers.rs (set CSP + baseline, strip disabled headers)
//!     → Send to client
//!
//! Proxied request:
//!     → proxy::forward (allow-list only; see HeaderAllowList)
//! ```
//!
//! # Design Decisions
//! - Headers computed once from immutable config
//! - Optional isolation headers default to off (plain-HTTP deployments)
//! - No trust in client input

pub mod headers;

pub use headers::{build_security_headers, security_headers_middleware, SecurityHeaderPolicy};
