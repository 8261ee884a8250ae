//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to target:
//!     → timeouts.rs (enforce the upstream deadline)
//!     → On failure: surfaced once as 502, never retried
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: one upstream failure is one downstream failure

pub mod timeouts;

pub use timeouts::{with_deadline, Elapsed};
