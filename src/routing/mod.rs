//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, URI, Origin)
//!     → target.rs (extract & decode `url` parameter)
//!     → router.rs (policy check)
//!     → Return: Info | UrlNotWhitelisted | Forbidden | Forward { target }
//! ```
//!
//! # Design Decisions
//! - Policy compiled at startup, immutable at runtime
//! - Deterministic: same input always yields the same route
//! - Preflight is orthogonal to the route; every route can be a preflight

pub mod router;
pub mod target;

pub use router::{classify, is_preflight, Route};
pub use target::extract_target;
