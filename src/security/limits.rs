//! Request limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size while buffering
//!
//! # Design Decisions
//! - The body is buffered once, then handed to the upstream client
//! - Return 413 Payload Too Large when the limit is exceeded

use axum::body::{Body, Bytes};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LimitError {
    #[error("Request body too large (limit {0} bytes)")]
    BodyTooLarge(usize),
}

/// Buffer a request body, failing once it grows past `max_bytes`.
pub async fn read_body(body: Body, max_bytes: usize) -> Result<Bytes, LimitError> {
    axum::body::to_bytes(body, max_bytes)
        .await
        .map_err(|_| LimitError::BodyTooLarge(max_bytes))
}
