//! Outbound header filtering.
//!
//! # Responsibilities
//! - Strip headers that identify the caller or the edge platform
//! - Decode the `x-cors-headers` override carrier
//! - Merge caller-supplied overrides after filtering
//!
//! # Design Decisions
//! - Name rules are prefix/substring matches on the lowercase name, so any
//!   header that merely contains `eferer` is dropped too
//! - Overrides are applied last and may reintroduce a filtered name
//! - A malformed override is ignored, never fatal

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

/// Inbound header carrying a JSON object of outbound header overrides.
pub const X_CORS_HEADERS: &str = "x-cors-headers";

const DROPPED_PREFIXES: &[&str] = &["origin", "cf-", "x-forw", X_CORS_HEADERS];
const DROPPED_SUBSTRINGS: &[&str] = &["eferer"];

/// Returns true if a header must not reach the target.
pub fn is_filtered(name: &HeaderName) -> bool {
    // HeaderName is always lowercase.
    let name = name.as_str();
    DROPPED_PREFIXES.iter().any(|p| name.starts_with(p))
        || DROPPED_SUBSTRINGS.iter().any(|s| name.contains(s))
}

/// Header overrides decoded from `x-cors-headers`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomHeaders {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl CustomHeaders {
    /// Decode overrides from the inbound headers.
    ///
    /// Returns `None` when the carrier is absent, empty, not JSON, or not a
    /// JSON object. Individual entries that are not valid headers are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = headers.get(X_CORS_HEADERS)?;
        if raw.is_empty() {
            return None;
        }
        let object = match serde_json::from_slice::<Value>(raw.as_bytes()) {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                tracing::debug!("x-cors-headers is not a JSON object, ignoring");
                return None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "Malformed x-cors-headers, ignoring");
                return None;
            }
        };

        let mut entries = Vec::with_capacity(object.len());
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    tracing::debug!(header = %key, "Skipping non-scalar override");
                    continue;
                }
            };
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(&text),
            ) {
                (Ok(name), Ok(value)) => entries.push((name, value)),
                _ => tracing::warn!(header = %key, "Skipping invalid header override"),
            }
        }
        Some(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

/// Build the header set sent to the target.
pub fn filter_outbound_headers(inbound: &HeaderMap, custom: Option<&CustomHeaders>) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if !is_filtered(name) {
            outbound.append(name.clone(), value.clone());
        }
    }

    if let Some(custom) = custom {
        for (name, value) in custom.iter() {
            outbound.insert(name.clone(), value.clone());
        }
    }
    outbound
}
