//! Target URL extraction.
//!
//! The target travels in the `url` query parameter. The parameter is
//! form-decoded like any query value and then percent-decoded once more, so
//! both `?url=http://x/?a=1` and `?url=http%3A%2F%2Fx%2F%3Fa%3D1` work.
//! A malformed escape in the second pass means there is no target.

use std::borrow::Cow;

use axum::http::Uri;
use percent_encoding::percent_decode_str;
use url::form_urlencoded;

/// Name of the query parameter carrying the target.
pub const TARGET_PARAM: &str = "url";

/// Extract and decode the target URL from a request URI.
///
/// Returns `None` when the parameter is missing, empty, or not decodable.
pub fn extract_target(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    let raw = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TARGET_PARAM)
        .map(|(_, value)| value)?;
    if raw.is_empty() {
        return None;
    }
    decode_component(&raw)
}

/// Strict percent-decoding: every `%` must start a two-digit hex escape and
/// the decoded bytes must be UTF-8.
fn decode_component(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let well_formed = value.match_indices('%').all(|(i, _)| {
        bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return None;
    }
    percent_decode_str(value)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}
