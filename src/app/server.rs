//! The `AppServer` trait and per-request context.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::config::GatewayConfig;
use crate::http::request::RequestId;
use crate::proxy::address::{self, AddressError};
use crate::ws::WebSocketCapability;

/// Boxed error for capability discovery; the application defines the
/// failure mode, the gateway only reports it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The framework server contract consumed by the dispatch chain.
pub trait AppServer: Send + Sync {
    /// Answer one request.
    ///
    /// There is no failure mode here on purpose: error pages are responses
    /// too, which is what makes this the terminal link of the chain.
    fn respond(&self, req: Request<Body>, ctx: RequestContext) -> BoxFuture<'static, Response>;

    /// Optional WebSocket capability declared by the build.
    ///
    /// Most builds have none. An `Err` is treated as "no capability" by the
    /// gate, with a warning, so a broken declaration cannot take the
    /// process down.
    fn websocket(&self) -> Result<Option<WebSocketCapability>, BoxError> {
        Ok(None)
    }
}

/// Platform-specific facts exposed to the application.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Transport peer address (a proxy, in production).
    pub remote_addr: Option<SocketAddr>,
    /// Correlation ID of the request being answered.
    pub request_id: RequestId,
}

/// Per-request context handed to [`AppServer::respond`].
pub struct RequestContext {
    config: Arc<GatewayConfig>,
    address_header_value: Option<String>,
    platform: Platform,
}

impl RequestContext {
    pub fn new(
        config: Arc<GatewayConfig>,
        address_header_value: Option<String>,
        platform: Platform,
    ) -> Self {
        Self {
            config,
            address_header_value,
            platform,
        }
    }

    /// Logical client address, resolved on demand.
    ///
    /// Pure with respect to the request: calling it twice gives the same
    /// answer. Depth-range and header-trust failures surface here, scoped
    /// to the request being answered.
    pub fn client_address(&self) -> Result<String, AddressError> {
        address::resolve(
            &self.config,
            self.address_header_value.as_deref(),
            self.platform.remote_addr,
        )
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(config: GatewayConfig, header_value: Option<&str>) -> RequestContext {
        RequestContext::new(
            Arc::new(config),
            header_value.map(str::to_string),
            Platform {
                remote_addr: Some("203.0.113.5:40000".parse().unwrap()),
                request_id: RequestId::new(),
            },
        )
    }

    #[test]
    fn client_address_uses_transport_when_no_header_configured() {
        let ctx = context(GatewayConfig::default(), None);
        assert_eq!(ctx.client_address().unwrap(), "203.0.113.5");
    }

    #[test]
    fn client_address_selects_by_depth() {
        let mut config = GatewayConfig::default();
        config.forwarded.address_header = Some("x-forwarded-for".to_string());
        config.forwarded.xff_depth = 2;

        let ctx = context(config, Some("1.1.1.1, 2.2.2.2, 3.3.3.3"));
        assert_eq!(ctx.client_address().unwrap(), "2.2.2.2");
    }

    #[test]
    fn client_address_is_idempotent() {
        let mut config = GatewayConfig::default();
        config.forwarded.address_header = Some("x-forwarded-for".to_string());

        let ctx = context(config, Some("1.1.1.1, 2.2.2.2"));
        assert_eq!(ctx.client_address().unwrap(), ctx.client_address().unwrap());
    }

    #[test]
    fn depth_error_surfaces_lazily() {
        let mut config = GatewayConfig::default();
        config.forwarded.address_header = Some("x-forwarded-for".to_string());
        config.forwarded.xff_depth = 9;

        let ctx = context(config, Some("1.1.1.1"));
        assert!(matches!(
            ctx.client_address(),
            Err(AddressError::DepthOutOfRange { .. })
        ));
    }
}
