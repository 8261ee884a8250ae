//! Regular-expression pattern lists.
//!
//! # Responsibilities
//! - Compile configured pattern strings once, at startup
//! - Answer "does this value match any pattern" without side effects
//!
//! # Design Decisions
//! - Unanchored search: a pattern matches anywhere in the value unless it
//!   anchors itself with `^` / `$`
//! - An absent value passes (absent Origin is not rejected)
//! - Empty list never matches a present value; callers decide what an
//!   empty whitelist means

use regex::Regex;
use thiserror::Error;

/// A pattern failed to compile.
#[derive(Debug, Error)]
#[error("invalid pattern `{pattern}`: {source}")]
pub struct PolicyError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// An ordered, immutable list of compiled patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    patterns: Vec<Regex>,
}

impl PatternList {
    /// Compile every pattern, failing on the first invalid one.
    pub fn new<I, S>(patterns: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|source| PolicyError {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}

/// Returns true if `value` is absent or matches at least one pattern.
pub fn matches(value: Option<&str>, patterns: &PatternList) -> bool {
    match value {
        Some(value) => patterns.patterns.iter().any(|re| re.is_match(value)),
        None => true,
    }
}
