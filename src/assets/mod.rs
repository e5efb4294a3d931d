//! Static bundle subsystem.
//!
//! # Data Flow
//! ```text
//! Request not claimed by health or proxy
//!     → server.rs (resolve path under the bundle root)
//!     → found: serve file with cache.rs directive + ETag
//!     → not found: SPA fallback (root document, 200)
//! ```
//!
//! # Design Decisions
//! - HTML and runtime config are never cached; everything else is immutable
//! - Unknown GET paths are client-side routes, not errors

pub mod cache;
pub mod server;

pub use cache::{CachePolicy, CacheRule, NO_STORE};
pub use server::StaticAssets;
