//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, tracing span)
//!     → routing (health | proxy | asset)
//!     → response.rs (JSON error rendering)
//!     → security headers applied
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{EdgeError, ErrorRenderer};
pub use server::{AppState, HttpServer};
