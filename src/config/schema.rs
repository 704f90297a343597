//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from the baked
//! `gateway.toml`; the environment overlay in `loader` mutates the result.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Prefix prepended to every environment variable lookup.
    ///
    /// Baked by the build phase so several gateways can share one
    /// environment without colliding.
    pub env_prefix: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Filesystem layout of the build being served.
    pub paths: PathsConfig,

    /// Trusted reverse-proxy header configuration.
    pub forwarded: ForwardedConfig,

    /// Static asset serving settings.
    pub assets: AssetsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// Full environment variable name for `name`, including the prefix.
    ///
    /// Used in error messages so operators see the exact variable they set.
    pub fn env_name(&self, name: &str) -> String {
        format!("{}{}", self.env_prefix, name)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000"). Hostnames are allowed.
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Filesystem layout of the served build.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the build output. `client/`, `prerendered/` and
    /// `manifest.json` are resolved relative to it.
    pub build_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("build"),
        }
    }
}

impl PathsConfig {
    /// Client asset root (hashed assets, copied static files).
    pub fn client_root(&self) -> PathBuf {
        self.build_dir.join("client")
    }

    /// Prerendered page root.
    pub fn prerendered_root(&self) -> PathBuf {
        self.build_dir.join("prerendered")
    }

    /// Build manifest location.
    pub fn manifest(&self) -> PathBuf {
        self.build_dir.join("manifest.json")
    }
}

/// Trusted reverse-proxy header configuration.
///
/// None of these headers is consulted unless explicitly configured here;
/// an unconfigured gateway trusts only the transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardedConfig {
    /// Absolute URL overriding the externally visible scheme and host.
    pub origin: Option<String>,

    /// How many proxy hops to count back from the end of an
    /// `x-forwarded-for` list. Must be at least 1.
    pub xff_depth: u32,

    /// Header carrying the logical client address, set by a trusted proxy.
    pub address_header: Option<String>,

    /// Header asserting the externally visible protocol (e.g. "https").
    pub protocol_header: Option<String>,

    /// Header asserting the externally visible host.
    pub host_header: Option<String>,

    /// Address reported when neither a configured header nor transport
    /// information applies. Only sensible for local development.
    pub fallback_address: String,
}

impl Default for ForwardedConfig {
    fn default() -> Self {
        Self {
            origin: None,
            xff_depth: 1,
            address_header: None,
            protocol_header: None,
            host_header: None,
            fallback_address: "127.0.0.1".to_string(),
        }
    }
}

/// Static asset serving settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Serve the client and prerendered roots at all. When false every
    /// request goes straight to the SSR responder.
    pub enabled: bool,

    /// Negotiate precompressed `.gz` siblings emitted by the build.
    pub gzip: bool,

    /// Negotiate precompressed `.br` siblings emitted by the build.
    pub brotli: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gzip: true,
            brotli: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit a diagnostic log line for every request reaching the SSR
    /// responder (method, URL, headers, remote address).
    pub log_requests: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_requests: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
