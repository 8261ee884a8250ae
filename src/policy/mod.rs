//! Access policy subsystem.
//!
//! # Data Flow
//! ```text
//! PolicyConfig (pattern strings)
//!     → matcher.rs (compile to PatternList)
//!     → AccessPolicy (immutable, shared via Arc)
//!     → check(target, origin) → Verdict
//! ```
//!
//! # Design Decisions
//! - The URL whitelist is checked first and only when non-empty
//! - A blacklisted target is never allowed, whatever the whitelist says
//! - An absent Origin passes the origin whitelist

pub mod matcher;

pub use matcher::{matches, PatternList, PolicyError};

use crate::config::PolicyConfig;

/// Outcome of evaluating a target and origin against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    /// A URL whitelist is configured and the target matches none of it.
    UrlNotWhitelisted,
    /// Target is blacklisted or the origin is not whitelisted.
    Forbidden,
}

/// The three compiled pattern lists.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    whitelist_urls: PatternList,
    blacklist_urls: PatternList,
    whitelist_origins: PatternList,
}

impl AccessPolicy {
    pub fn new(
        whitelist_urls: PatternList,
        blacklist_urls: PatternList,
        whitelist_origins: PatternList,
    ) -> Self {
        Self {
            whitelist_urls,
            blacklist_urls,
            whitelist_origins,
        }
    }

    /// Compile the policy lists from configuration.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, PolicyError> {
        Ok(Self::new(
            PatternList::new(&config.whitelist_urls)?,
            PatternList::new(&config.blacklist_urls)?,
            PatternList::new(&config.whitelist_origins)?,
        ))
    }

    /// Decide whether `target` may be fetched on behalf of `origin`.
    pub fn check(&self, target: &str, origin: Option<&str>) -> Verdict {
        if !self.whitelist_urls.is_empty() && !matches(Some(target), &self.whitelist_urls) {
            return Verdict::UrlNotWhitelisted;
        }
        if matches(Some(target), &self.blacklist_urls)
            || !matches(origin, &self.whitelist_origins)
        {
            return Verdict::Forbidden;
        }
        Verdict::Allowed
    }
}
