//! Response construction for every route.
//!
//! # Responsibilities
//! - Render the info page and the two 403 pages
//! - Turn the target's response into the caller's response
//! - Map upstream failures to 502 Bad Gateway
//!
//! # Design Decisions
//! - Connection-level framing headers from the target are dropped;
//!   `content-length` is kept unless the body is replaced (preflight)
//! - The complete original header set is echoed in `cors-received-headers`

use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::BTreeSet;
use std::fmt::Write as _;

use axum::body::Body;
use axum::http::header::{ACCESS_CONTROL_EXPOSE_HEADERS, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::IdentityConfig;
use crate::http::cors::{apply_cors_headers, CorsRequest};
use crate::http::request::ConnectionMeta;
use crate::upstream::{ForwardError, UpstreamResponse};

/// Response header carrying the target's headers as a JSON object.
pub const CORS_RECEIVED_HEADERS: &str = "cors-received-headers";

const FRAMING_HEADERS: &[&str] = &["transfer-encoding", "connection", "keep-alive"];

/// Everything shown on the info page.
#[derive(Debug, Clone)]
pub struct InfoPage<'a> {
    pub identity: &'a IdentityConfig,
    /// The proxy's own origin, used in the usage line.
    pub self_origin: &'a str,
    /// The caller's Origin header, if any.
    pub origin: Option<&'a str>,
    pub meta: &'a ConnectionMeta,
}

impl InfoPage<'_> {
    pub fn render(&self) -> String {
        let mut body = format!(
            "{}\n\nSource:\n{}\n\nUsage:\n{}/?url=<url>\n\n",
            self.identity.name, self.identity.source_url, self.self_origin
        );
        if let Some(origin) = self.origin {
            let _ = writeln!(body, "Origin: {origin}");
        }
        if let Some(ip) = &self.meta.client_ip {
            let _ = writeln!(body, "IP: {ip}");
        }
        if let Some(country) = &self.meta.country {
            let _ = writeln!(body, "Country: {country}");
        }
        if let Some(colo) = &self.meta.colo {
            let _ = writeln!(body, "Datacenter: {colo}");
        }
        body.push('\n');
        body
    }

    /// 200 with CORS headers, preflight-aware.
    pub fn into_response(self, cors: &CorsRequest, preflight: bool) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        apply_cors_headers(&mut headers, cors, preflight);
        (StatusCode::OK, headers, self.render()).into_response()
    }
}

/// 403 for targets outside a configured URL whitelist. No CORS headers.
pub fn not_whitelisted() -> Response {
    (StatusCode::FORBIDDEN, "Target URL is not allowed by whitelist.").into_response()
}

/// 403 for blacklisted targets and rejected origins. No CORS headers.
pub fn forbidden(identity: &IdentityConfig) -> Response {
    let source = &identity.source_url;
    let donate = &identity.donate_url;
    let body = format!(
        "Create your own CORS proxy</br>\n\
         <a href='{source}'>{source}</a></br>\n\
         \nDonate</br>\n\
         <a href='{donate}'>{donate}</a>\n"
    );
    (
        StatusCode::FORBIDDEN,
        [(CONTENT_TYPE, HeaderValue::from_static("text/html"))],
        body,
    )
        .into_response()
}

/// 502 naming the upstream failure.
pub fn bad_gateway(err: &ForwardError) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        format!("Error fetching target URL: {err}"),
    )
        .into_response()
}

/// 413 for inbound bodies over the configured limit.
pub fn payload_too_large() -> Response {
    (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
}

/// Serialize every upstream header as a JSON object, joining repeated
/// headers with ", ".
pub fn received_headers_json(headers: &HeaderMap) -> String {
    let mut all: BTreeMap<&str, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match all.entry(name.as_str()) {
            Entry::Occupied(mut joined) => {
                let joined = joined.get_mut();
                joined.push_str(", ");
                joined.push_str(&value);
            }
            Entry::Vacant(slot) => {
                slot.insert(value.into_owned());
            }
        }
    }
    serde_json::to_string(&all).unwrap_or_else(|_| "{}".to_string())
}

/// Distinct upstream header names, sorted, followed by `cors-received-headers`.
pub fn expose_headers_list(headers: &HeaderMap) -> String {
    headers
        .keys()
        .map(HeaderName::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .chain(std::iter::once(CORS_RECEIVED_HEADERS))
        .collect::<Vec<_>>()
        .join(",")
}

/// Rewrite the target's response for the caller.
///
/// Preflight responses are forced to 200 with an empty body; anything else
/// keeps the target's status and body bytes.
pub fn forwarded(upstream: UpstreamResponse, cors: &CorsRequest, preflight: bool) -> Response {
    let UpstreamResponse {
        status,
        headers: received,
        body,
    } = upstream;

    let mut headers = received.clone();
    for name in FRAMING_HEADERS {
        headers.remove(*name);
    }
    // The upstream length still describes the buffered body, HEAD included.
    if preflight {
        headers.remove(CONTENT_LENGTH);
    }
    apply_cors_headers(&mut headers, cors, preflight);

    match HeaderValue::from_str(&expose_headers_list(&received)) {
        Ok(value) => {
            headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, value);
        }
        Err(e) => tracing::warn!(error = %e, "Cannot encode Access-Control-Expose-Headers"),
    }
    match HeaderValue::from_bytes(received_headers_json(&received).as_bytes()) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(CORS_RECEIVED_HEADERS), value);
        }
        Err(e) => tracing::warn!(error = %e, "Cannot encode cors-received-headers"),
    }

    let (status, body) = if preflight {
        (StatusCode::OK, Body::empty())
    } else {
        (status, Body::from(body))
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
