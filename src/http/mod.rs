//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, handler)
//!     → request.rs (request ID, connection metadata)
//!     → [routing classifies: info / 403 / forward]
//!     → [upstream client fetches the target]
//!     → cors.rs + response.rs (rewrite headers, build response)
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use cors::{apply_cors_headers, CorsRequest};
pub use request::{
    drop_generated_request_id, mark_caller_request_id, CallerRequestId, ConnectionMeta,
    MakeRequestUuid, RequestIdExt, X_REQUEST_ID,
};
pub use server::{AppState, HttpServer, ServerError};
