//! CORS response headers.
//!
//! The allowed origin is always the caller's own `Origin`, reflected
//! byte-for-byte, so credentialed requests keep working. It is never `*`.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, X_CONTENT_TYPE_OPTIONS,
};
use axum::http::{HeaderMap, HeaderValue};

/// The inbound headers the CORS decision depends on.
#[derive(Debug, Clone, Default)]
pub struct CorsRequest {
    pub origin: Option<HeaderValue>,
    pub request_method: Option<HeaderValue>,
    pub request_headers: Option<HeaderValue>,
}

impl CorsRequest {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            origin: headers.get(ORIGIN).cloned(),
            request_method: headers.get(ACCESS_CONTROL_REQUEST_METHOD).cloned(),
            request_headers: headers.get(ACCESS_CONTROL_REQUEST_HEADERS).cloned(),
        }
    }
}

/// Decorate `headers` so the browser accepts the response.
pub fn apply_cors_headers(headers: &mut HeaderMap, request: &CorsRequest, preflight: bool) {
    set_or_remove(headers, ACCESS_CONTROL_ALLOW_ORIGIN, request.origin.as_ref());

    if preflight {
        set_or_remove(headers, ACCESS_CONTROL_ALLOW_METHODS, request.request_method.as_ref());
        if let Some(requested) = &request.request_headers {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
        }
        headers.remove(X_CONTENT_TYPE_OPTIONS);
    }
}

fn set_or_remove(
    headers: &mut HeaderMap,
    name: axum::http::HeaderName,
    value: Option<&HeaderValue>,
) {
    match value {
        Some(value) => {
            headers.insert(name, value.clone());
        }
        None => {
            headers.remove(name);
        }
    }
}
