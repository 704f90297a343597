//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (xff depth positive, bind address well-formed)
//! - Check header names and the origin URL before any request uses them
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use axum::http::header::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic violation found in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("xff_depth must be a positive integer")]
    XffDepthNotPositive,

    #[error("origin must be an absolute http(s) URL, got {0:?}")]
    InvalidOrigin(String),

    #[error("{field} is not a valid header name: {value:?}")]
    InvalidHeaderName { field: &'static str, value: String },

    #[error("bind address {0:?} must be host:port")]
    InvalidBindAddress(String),

    #[error("metrics address {0:?} must be a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a loaded configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.forwarded.xff_depth < 1 {
        errors.push(ValidationError::XffDepthNotPositive);
    }

    if let Some(origin) = &config.forwarded.origin {
        match Url::parse(origin) {
            Ok(url) if (url.scheme() == "http" || url.scheme() == "https") && url.has_host() => {}
            _ => errors.push(ValidationError::InvalidOrigin(origin.clone())),
        }
    }

    for (field, value) in [
        ("address_header", &config.forwarded.address_header),
        ("protocol_header", &config.forwarded.protocol_header),
        ("host_header", &config.forwarded.host_header),
    ] {
        if let Some(value) = value {
            if HeaderName::from_bytes(value.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidHeaderName {
                    field,
                    value: value.clone(),
                });
            }
        }
    }

    if !bind_address_ok(&config.listener.bind_address) {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Hostnames are resolved at bind time, so only the shape is checked here.
fn bind_address_ok(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
