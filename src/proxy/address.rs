//! Logical client address resolution.
//!
//! The truthful client identity behind one or more proxies comes from a
//! header set by a trusted upstream, never from the transport alone. That
//! header is only consulted when explicitly configured; `x-forwarded-for`
//! additionally selects an entry by hop depth, counted from the right.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::GatewayConfig;

/// The one header name with list semantics.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Request-scoped address resolution failures.
///
/// These fail the affected request only; the process and other in-flight
/// requests are untouched. Messages name the environment variable (with its
/// prefix) so a misconfigured deployment is diagnosable from one log line.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address header was specified with {var}={header} but is absent from the request")]
    HeaderMissing { var: String, header: String },

    #[error("{var} must be a positive integer")]
    DepthNotPositive { var: String },

    #[error("{var} is {depth}, but only found {count} addresses")]
    DepthOutOfRange { var: String, depth: u32, count: usize },
}

/// Resolve the logical client address for one request.
///
/// `header_value` is the value of the configured address header, if that
/// header was present; `remote` is the transport's peer address.
pub fn resolve(
    config: &GatewayConfig,
    header_value: Option<&str>,
    remote: Option<SocketAddr>,
) -> Result<String, AddressError> {
    let forwarded = &config.forwarded;

    if let Some(header) = &forwarded.address_header {
        let value = header_value.ok_or_else(|| AddressError::HeaderMissing {
            var: config.env_name("ADDRESS_HEADER"),
            header: header.clone(),
        })?;

        if header == FORWARDED_FOR {
            return select_forwarded_for(config, value);
        }

        return Ok(value.trim().to_string());
    }

    Ok(remote
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| forwarded.fallback_address.clone()))
}

/// Depth 1 is the last entry (nearest proxy), depth N counts further left.
fn select_forwarded_for(config: &GatewayConfig, value: &str) -> Result<String, AddressError> {
    let addresses: Vec<&str> = value.split(',').map(str::trim).collect();
    let depth = config.forwarded.xff_depth;

    if depth < 1 {
        return Err(AddressError::DepthNotPositive {
            var: config.env_name("XFF_DEPTH"),
        });
    }

    if depth as usize > addresses.len() {
        return Err(AddressError::DepthOutOfRange {
            var: config.env_name("XFF_DEPTH"),
            depth,
            count: addresses.len(),
        });
    }

    Ok(addresses[addresses.len() - depth as usize].to_string())
}
