//! Request classification.
//!
//! # Responsibilities
//! - Extract the target URL
//! - Evaluate the access policy
//! - Return exactly one route per request
//!
//! # Design Decisions
//! - Pure function of URI, Origin and policy (no I/O); preflight handling
//!   is decided separately from the method by `is_preflight`
//! - Explicit Info route rather than an error when there is no target
//! - Policy rejections are routes, not errors

use axum::http::{Method, Uri};

use crate::policy::{AccessPolicy, Verdict};
use crate::routing::target::extract_target;

/// What the proxy will do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// No target: serve the info page.
    Info,
    /// Target rejected by a non-empty URL whitelist.
    UrlNotWhitelisted,
    /// Target blacklisted, or Origin not whitelisted.
    Forbidden,
    /// Forward to the decoded target.
    Forward { target: String },
}

/// Returns true for CORS preflight requests.
pub fn is_preflight(method: &Method) -> bool {
    *method == Method::OPTIONS
}

/// Classify a request into its route.
pub fn classify(uri: &Uri, origin: Option<&str>, policy: &AccessPolicy) -> Route {
    let Some(target) = extract_target(uri) else {
        return Route::Info;
    };

    match policy.check(&target, origin) {
        Verdict::Allowed => Route::Forward { target },
        Verdict::UrlNotWhitelisted => Route::UrlNotWhitelisted,
        Verdict::Forbidden => Route::Forbidden,
    }
}
