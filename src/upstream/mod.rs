//! Upstream subsystem: the single outbound fetch per forwarded request.
//!
//! # Data Flow
//! ```text
//! OutboundRequest (method, target, filtered headers, body)
//!     → client.rs (strip transport headers, follow redirects)
//!     → resilience::timeouts (deadline)
//!     → UpstreamResponse (status, headers, buffered body) | ForwardError
//! ```

pub mod client;

pub use client::{ForwardError, OutboundRequest, UpstreamClient, UpstreamResponse};
