//! Request identification and connection metadata.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the caller sent none
//! - Keep generated IDs internal: only a caller's own ID reaches the target
//! - Read the client IP and geolocation the edge platform attached
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Edge metadata is optional; every field degrades to `None`

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{Extensions, HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::EdgeConfig;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Access to the request ID of a request that went through the ID layer.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Whether the caller sent its own `x-request-id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerRequestId(pub bool);

/// Record whether the caller sent `x-request-id`, before the ID layer fills
/// one in. Runs outside `SetRequestIdLayer`.
pub async fn mark_caller_request_id(mut request: Request<Body>) -> Request<Body> {
    let sent = request.headers().contains_key(&X_REQUEST_ID);
    request.extensions_mut().insert(CallerRequestId(sent));
    request
}

/// Remove an `x-request-id` the proxy generated, keeping one the caller sent.
pub fn drop_generated_request_id(headers: &mut HeaderMap, extensions: &Extensions) {
    let sent = extensions
        .get::<CallerRequestId>()
        .is_some_and(|CallerRequestId(sent)| *sent);
    if !sent {
        headers.remove(&X_REQUEST_ID);
    }
}

/// Read a header as trimmed text, treating empty values as absent.
pub fn header_text(headers: &HeaderMap, name: impl AsRef<str>) -> Option<String> {
    let value = headers.get(name.as_ref())?;
    let text = String::from_utf8_lossy(value.as_bytes());
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Connection metadata supplied by the hosting edge, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionMeta {
    pub client_ip: Option<String>,
    pub country: Option<String>,
    pub colo: Option<String>,
}

impl ConnectionMeta {
    /// Build from edge headers, falling back to the TCP peer for the IP.
    pub fn from_request(headers: &HeaderMap, peer: Option<SocketAddr>, edge: &EdgeConfig) -> Self {
        let client_ip = header_text(headers, &edge.client_ip_header)
            .or_else(|| peer.map(|addr| addr.ip().to_string()));

        // "XX" is the edge's code for an unknown country.
        let country = header_text(headers, &edge.country_header)
            .filter(|c| !c.eq_ignore_ascii_case("xx"));

        let colo = header_text(headers, &edge.ray_header).and_then(|ray| {
            ray.rsplit_once('-')
                .map(|(_, colo)| colo.to_string())
                .filter(|colo| !colo.is_empty())
        });

        Self {
            client_ip,
            country,
            colo,
        }
    }
}
