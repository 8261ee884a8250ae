//! Outbound fetch to the target URL.

use std::error::Error as _;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

use crate::config::TimeoutConfig;
use crate::resilience::{with_deadline, Elapsed};

/// Headers the HTTP client computes itself for the new connection.
const TRANSPORT_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "connection",
    "transfer-encoding",
    "upgrade",
    "te",
    "keep-alive",
    "proxy-connection",
];

/// Errors reaching the target. All of them map to 502.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid target URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{}", describe(.0))]
    Request(#[from] reqwest::Error),

    #[error("upstream {0}")]
    Timeout(#[from] Elapsed),
}

/// Render an error with its whole source chain.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// The request sent to the target.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// The target's fully buffered response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// HTTP client used for every forwarded request.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    deadline: Duration,
}

impl UpstreamClient {
    /// Build a client with the configured timeouts. Redirects are followed.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .redirect(reqwest::redirect::Policy::default())
            .build()?;
        Ok(Self {
            client,
            deadline: Duration::from_secs(timeouts.upstream_secs),
        })
    }

    /// Send `request` and buffer the response body, within the deadline.
    pub async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, ForwardError> {
        let url = reqwest::Url::parse(&request.url)?;

        let mut headers = request.headers;
        for name in TRANSPORT_HEADERS {
            headers.remove(*name);
        }

        let mut builder = self.client.request(request.method, url).headers(headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        with_deadline(self.deadline, async move {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, ForwardError>(UpstreamResponse {
                status,
                headers,
                body,
            })
        })
        .await?
    }
}
