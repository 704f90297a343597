//! The WebSocket gate.
//!
//! # Responsibilities
//! - Probe the build once at startup for an upgrade capability
//! - Test upgrade-related headers on every arriving request
//! - Divert qualifying requests before the dispatch chain runs
//!
//! # Design Decisions
//! - Discovery failure is not fatal: the gate logs a warning and the
//!   process serves plain HTTP for its lifetime
//! - Once a request qualifies, the chain never runs; even when the
//!   upgrade routine itself fails, the failure response is the answer

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::Response;

use crate::app::server::AppServer;
use crate::http::request::ConnectionContext;
use crate::http::response::error_response;
use crate::ws::capability::WebSocketCapability;

/// What the gate decided about one request.
pub enum Gated {
    /// Intercepted: this response is final and the chain must not run.
    Upgrade(Response),
    /// Not a qualifying upgrade; continue into the dispatch chain.
    Pass(Request<Body>),
}

pub struct WebSocketGate {
    capability: Option<WebSocketCapability>,
}

impl WebSocketGate {
    /// A gate that passes everything through.
    pub fn disabled() -> Self {
        Self { capability: None }
    }

    /// Probe the build for an upgrade capability, once, at startup.
    pub fn discover(app: &dyn AppServer) -> Self {
        match app.websocket() {
            Ok(Some(capability)) => {
                tracing::info!("build declares a websocket capability");
                Self {
                    capability: Some(capability),
                }
            }
            Ok(None) => Self::disabled(),
            Err(error) => {
                tracing::warn!(
                    %error,
                    "websocket capability probe failed; continuing without upgrade support"
                );
                Self::disabled()
            }
        }
    }

    pub fn enabled(&self) -> bool {
        self.capability.is_some()
    }

    /// Both tests must hold: `connection` lists an upgrade and the upgrade
    /// target is websocket. Case-insensitive; `connection` may carry a list
    /// (`keep-alive, Upgrade`).
    pub fn is_upgrade_request(headers: &HeaderMap) -> bool {
        let connection_upgrade = headers
            .get(header::CONNECTION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase().contains("upgrade"))
            .unwrap_or(false);

        let upgrade_websocket = headers
            .get(header::UPGRADE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.eq_ignore_ascii_case("websocket"))
            .unwrap_or(false);

        connection_upgrade && upgrade_websocket
    }

    /// Screen one request before dispatch.
    pub async fn screen(&self, req: Request<Body>, ctx: &ConnectionContext) -> Gated {
        let capability = match &self.capability {
            Some(capability) => capability,
            None => return Gated::Pass(req),
        };

        if !Self::is_upgrade_request(req.headers()) {
            return Gated::Pass(req);
        }

        match capability.handle(req, ctx).await {
            Ok(response) => Gated::Upgrade(response),
            Err(error) => {
                tracing::debug!(request_id = %ctx.request_id, %error, "websocket upgrade rejected");
                Gated::Upgrade(error_response(StatusCode::BAD_REQUEST, &error.to_string()))
            }
        }
    }
}
