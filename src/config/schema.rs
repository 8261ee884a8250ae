//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the CORS proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// URL and origin pattern lists.
    pub policy: PolicyConfig,

    /// Project identity shown on the info and forbidden pages.
    pub identity: IdentityConfig,

    /// Edge platform headers carrying connection metadata.
    pub edge: EdgeConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Regular-expression lists gating which targets and origins are served.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// If non-empty, the target URL must match at least one pattern.
    pub whitelist_urls: Vec<String>,

    /// Target URLs matching any of these patterns are refused.
    pub blacklist_urls: Vec<String>,

    /// The request Origin must match one of these (absent Origin passes).
    pub whitelist_origins: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            whitelist_urls: Vec::new(),
            blacklist_urls: Vec::new(),
            whitelist_origins: vec![".*".to_string()],
        }
    }
}

/// Project identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub name: String,
    pub source_url: String,
    pub donate_url: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: "CorsAnywhere".to_string(),
            source_url: "https://github.com/waruhachi/corsanywhere".to_string(),
            donate_url: "https://paypal.me/Zibri/5".to_string(),
        }
    }
}

/// Names of the headers an edge platform uses to describe the connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Header carrying the connecting client IP.
    pub client_ip_header: String,

    /// Header carrying the client's ISO country code.
    pub country_header: String,

    /// Header carrying the ray id; its suffix names the datacenter.
    pub ray_header: String,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            client_ip_header: "cf-connecting-ip".to_string(),
            country_header: "cf-ipcountry".to_string(),
            ray_header: "cf-ray".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for the whole upstream fetch (headers and body) in seconds.
    pub upstream_secs: u64,

    /// Inbound request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
