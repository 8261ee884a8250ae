//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create Axum Router with the single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Classify each request and execute its route
//! - Forward allowed requests to the target

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header::ORIGIN, HeaderMap, Request, Uri},
    middleware,
    response::Response,
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::cors::CorsRequest;
use crate::http::request::{
    drop_generated_request_id, header_text, mark_caller_request_id, ConnectionMeta,
    MakeRequestUuid, RequestIdExt,
};
use crate::http::response::{self, InfoPage};
use crate::policy::{AccessPolicy, PolicyError};
use crate::routing::{classify, is_preflight, Route};
use crate::security::{filter_outbound_headers, read_body, CustomHeaders};
use crate::upstream::{ForwardError, OutboundRequest, UpstreamClient};

/// Errors building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("upstream client: {0}")]
    Client(#[from] ForwardError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub policy: Arc<AccessPolicy>,
    pub client: UpstreamClient,
}

/// HTTP server for the CORS proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let config = Arc::new(config);
        let policy = Arc::new(AccessPolicy::from_config(&config.policy)?);
        let client = UpstreamClient::new(&config.timeouts)?;

        let state = AppState {
            config: config.clone(),
            policy,
            client,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request.request_id(),
                    method = %request.method(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(middleware::map_request(mark_caller_request_id))
    }

    /// The fully layered router, e.g. for driving it without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Classifies the request, then serves the info page, a 403, or the
/// target's response.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (mut parts, body) = request.into_parts();
    let preflight = is_preflight(&parts.method);
    let origin = parts
        .headers
        .get(ORIGIN)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    let cors = CorsRequest::from_headers(&parts.headers);
    let config = &state.config;

    match classify(&parts.uri, origin.as_deref(), &state.policy) {
        Route::Info => {
            let meta = ConnectionMeta::from_request(&parts.headers, peer, &config.edge);
            let self_origin = self_origin(&parts.headers, &parts.uri);
            tracing::debug!(preflight, "Serving info page");
            InfoPage {
                identity: &config.identity,
                self_origin: &self_origin,
                origin: origin.as_deref(),
                meta: &meta,
            }
            .into_response(&cors, preflight)
        }
        Route::UrlNotWhitelisted => {
            tracing::info!(origin = ?origin, "Target not in URL whitelist");
            response::not_whitelisted()
        }
        Route::Forbidden => {
            tracing::info!(origin = ?origin, "Target blacklisted or origin not allowed");
            response::forbidden(&config.identity)
        }
        Route::Forward { target } => {
            let body = match read_body(body, config.security.max_body_size).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(target_url = %target, error = %e, "Rejecting request body");
                    return response::payload_too_large();
                }
            };

            drop_generated_request_id(&mut parts.headers, &parts.extensions);
            let custom = CustomHeaders::from_headers(&parts.headers);
            let outbound = OutboundRequest {
                method: parts.method.clone(),
                url: target.clone(),
                headers: filter_outbound_headers(&parts.headers, custom.as_ref()),
                body,
            };

            tracing::debug!(target_url = %target, method = %parts.method, preflight, "Forwarding request");

            match state.client.send(outbound).await {
                Ok(upstream) => {
                    tracing::info!(
                        target_url = %target,
                        status = upstream.status.as_u16(),
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Upstream responded"
                    );
                    response::forwarded(upstream, &cors, preflight)
                }
                Err(e) => {
                    tracing::warn!(
                        target_url = %target,
                        error = %e,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Upstream error"
                    );
                    response::bad_gateway(&e)
                }
            }
        }
    }
}

/// The proxy's own origin as the caller sees it.
fn self_origin(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = header_text(headers, "x-forwarded-proto")
        .and_then(|proto| proto.split(',').next().map(|p| p.trim().to_string()))
        .filter(|proto| !proto.is_empty())
        .unwrap_or_else(|| "http".to_string());
    let host = header_text(headers, "host")
        .or_else(|| uri.authority().map(ToString::to_string))
        .unwrap_or_else(|| "localhost".to_string());
    format!("{scheme}://{host}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    fn router(config: ProxyConfig) -> Router {
        HttpServer::new(config).unwrap().router()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_self_origin() {
        let mut headers = HeaderMap::new();
        let uri: Uri = "/".parse().unwrap();
        assert_eq!(self_origin(&headers, &uri), "http://localhost");

        headers.insert("host", "proxy.example".parse().unwrap());
        headers.insert("x-forwarded-proto", "https, http".parse().unwrap());
        assert_eq!(self_origin(&headers, &uri), "https://proxy.example");
    }

    #[tokio::test]
    async fn test_info_page() {
        let response = router(ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("host", "proxy.example")
                    .header("origin", "https://app.example")
                    .header("cf-connecting-ip", "203.0.113.7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example");
        assert!(response.headers().get("x-request-id").is_some());
        let body = body_text(response).await;
        assert!(body.contains("github.com/waruhachi/corsanywhere"));
        assert!(body.contains("http://proxy.example/?url=<url>"));
        assert!(body.contains("Origin: https://app.example\n"));
        assert!(body.contains("IP: 203.0.113.7\n"));
        assert!(!body.contains("Country:"));
    }

    #[tokio::test]
    async fn test_info_page_preflight() {
        let response = router(ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/")
                    .header("origin", "https://app.example")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_METHODS], "POST");
    }

    #[tokio::test]
    async fn test_keeps_caller_request_id() {
        let response = router(ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn test_url_whitelist_rejection_has_no_cors() {
        let mut config = ProxyConfig::default();
        config.policy.whitelist_urls = vec!["^https://allowed\\.example/".into()];

        let response = router(config)
            .oneshot(
                Request::builder()
                    .uri("/?url=https%3A%2F%2Fother.example%2F")
                    .header("origin", "https://app.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(body_text(response).await, "Target URL is not allowed by whitelist.");
    }

    #[tokio::test]
    async fn test_origin_rejection() {
        let mut config = ProxyConfig::default();
        config.policy.whitelist_origins = vec!["^https://good\\.example$".into()];

        let response = router(config)
            .oneshot(
                Request::builder()
                    .uri("/?url=http://target.example/")
                    .header("origin", "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_body_over_limit() {
        let mut config = ProxyConfig::default();
        config.security.max_body_size = 4;

        let response = router(config)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/?url=http://127.0.0.1:9/")
                    .body(Body::from("too long"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_invalid_target_is_bad_gateway() {
        let response = router(ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/?url=not-a-url")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response)
            .await
            .starts_with("Error fetching target URL: invalid target URL"));
    }

    #[test]
    fn test_invalid_pattern_fails_construction() {
        let mut config = ProxyConfig::default();
        config.policy.blacklist_urls = vec!["(".into()];
        assert!(matches!(HttpServer::new(config), Err(ServerError::Policy(_))));
    }
}
