//! API proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Request under the reserved prefix
//!     → headers.rs (allow-list copy, X-Forwarded-* chain)
//!     → body.rs (JSON reconstruction or passthrough)
//!     → forward.rs (send to gateway, single attempt)
//!     → Upstream response passed through, or 502 JSON
//! ```

pub mod body;
pub mod forward;
pub mod headers;

pub use forward::Forwarder;
pub use headers::HeaderAllowList;
