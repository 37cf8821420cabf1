//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::BackendVariant;
use crate::strm::StrmKind;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Media-server API family in front of which the gateway runs.
    pub backend: BackendVariant,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Origin media server.
    pub origin: OriginConfig,

    /// STRM pointer-file detection.
    pub strm: StrmConfig,

    /// Alist instance used to sign Alist STRM targets.
    pub alist: Option<AlistConfig>,

    /// Image and subtitle caching.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9000".to_string(),
        }
    }
}

/// Origin media server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL (e.g., "http://127.0.0.1:8096").
    pub url: String,

    /// API key used for metadata queries. Empty = omit.
    pub api_key: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8096".to_string(),
            api_key: String::new(),
        }
    }
}

/// STRM detection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StrmConfig {
    /// Pointer-file extension, including the dot.
    pub extension: String,

    /// Prefix rules, checked in order.
    pub rules: Vec<StrmRuleConfig>,
}

impl Default for StrmConfig {
    fn default() -> Self {
        Self {
            extension: ".strm".to_string(),
            rules: Vec::new(),
        }
    }
}

/// A single STRM prefix rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrmRuleConfig {
    /// Item path prefix (e.g., "/strm/http/").
    pub prefix: String,

    pub kind: StrmKind,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Alist signing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlistConfig {
    /// Public base URL of the Alist instance.
    pub url: String,

    /// Alist token used as the HMAC key.
    pub token: String,

    /// Signature lifetime in seconds. 0 = never expires.
    pub sign_expire_secs: u64,
}

impl Default for AlistConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5244".to_string(),
            token: String::new(),
            sign_expire_secs: 0,
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache item images.
    pub image: bool,

    /// Cache subtitle streams.
    pub subtitle: bool,

    /// Entry lifetime in seconds.
    pub ttl_secs: u64,

    /// Maximum number of stored entries.
    pub max_entries: usize,

    /// Largest response body that will be stored.
    pub max_entry_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            image: true,
            subtitle: true,
            ttl_secs: 24 * 60 * 60,
            max_entries: 4096,
            max_entry_bytes: 8 * 1024 * 1024, // 8MB
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time to response headers for proxied requests, in seconds.
    pub request_secs: u64,

    /// Metadata query timeout in seconds.
    pub metadata_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            metadata_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:9001".to_string(),
        }
    }
}
