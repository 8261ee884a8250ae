//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (buffer body within the configured size)
//!     → headers.rs (strip identifying headers, merge x-cors-headers overrides)
//!     → Pass to upstream client
//! ```
//!
//! # Design Decisions
//! - Nothing identifying the caller or the edge reaches the target
//!   unless the caller puts it back explicitly through an override

pub mod headers;
pub mod limits;

pub use headers::{filter_outbound_headers, CustomHeaders, X_CORS_HEADERS};
pub use limits::{read_body, LimitError};
