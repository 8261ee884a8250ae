//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every policy pattern compiles
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check edge header names and log format
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use regex::Regex;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("policy.{list}: invalid pattern `{pattern}`: {reason}")]
    Pattern {
        list: &'static str,
        pattern: String,
        reason: String,
    },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.upstream_secs ({upstream}) exceeds timeouts.request_secs ({request})")]
    UpstreamExceedsRequest { upstream: u64, request: u64 },

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("edge.{field}: `{value}` is not a valid header name")]
    HeaderName { field: &'static str, value: String },

    #[error("observability.log_format `{0}` must be \"pretty\" or \"json\"")]
    LogFormat(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let lists = [
        ("whitelist_urls", &config.policy.whitelist_urls),
        ("blacklist_urls", &config.policy.blacklist_urls),
        ("whitelist_origins", &config.policy.whitelist_origins),
    ];
    for (list, patterns) in lists {
        for pattern in patterns {
            if let Err(e) = Regex::new(pattern) {
                errors.push(ValidationError::Pattern {
                    list,
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("connect_secs", timeouts.connect_secs),
        ("upstream_secs", timeouts.upstream_secs),
        ("request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }
    if timeouts.upstream_secs > timeouts.request_secs {
        errors.push(ValidationError::UpstreamExceedsRequest {
            upstream: timeouts.upstream_secs,
            request: timeouts.request_secs,
        });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let edge = &config.edge;
    for (field, value) in [
        ("client_ip_header", &edge.client_ip_header),
        ("country_header", &edge.country_header),
        ("ray_header", &edge.ray_header),
    ] {
        if HeaderName::from_bytes(value.as_bytes()).is_err() {
            errors.push(ValidationError::HeaderName {
                field,
                value: value.clone(),
            });
        }
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::LogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
