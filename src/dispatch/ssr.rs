//! The SSR responder: terminal link of the dispatch chain.
//!
//! # Responsibilities
//! - Resolve the canonical URL (origin override, trusted host/protocol
//!   headers) and rebind the request when it changed
//! - Enforce the configured address header's presence before the
//!   application runs
//! - Hand the request to the application server with lazy client-address
//!   resolution and platform context
//! - Emit the per-request diagnostic log when enabled
//!
//! # Design Decisions
//! - This link never declines: the application contract always produces a
//!   response, so the chain cannot fall past it
//! - Resolution failures are request-scoped error responses, never panics

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::app::{AppServer, Platform, RequestContext};
use crate::config::GatewayConfig;
use crate::dispatch::handler::{Handler, Step};
use crate::http::request::{self, ConnectionContext};
use crate::http::response::error_response;
use crate::proxy::address::AddressError;
use crate::proxy::origin;

pub struct SsrHandler {
    app: Arc<dyn AppServer>,
    config: Arc<GatewayConfig>,
}

impl SsrHandler {
    pub fn new(app: Arc<dyn AppServer>, config: Arc<GatewayConfig>) -> Self {
        Self { app, config }
    }

    async fn respond(&self, req: Request<Body>, ctx: &ConnectionContext) -> Response {
        if self.config.observability.log_requests {
            tracing::info!(
                request_id = %ctx.request_id,
                method = %req.method(),
                uri = %req.uri(),
                remote = ?ctx.remote_addr,
                headers = ?req.headers(),
                "request"
            );
        }

        let canonical = match origin::canonical_url(req.uri(), req.headers()) {
            Ok(url) => url,
            Err(error) => {
                tracing::debug!(request_id = %ctx.request_id, %error, "unresolvable request target");
                return error_response(StatusCode::BAD_REQUEST, &error.to_string());
            }
        };

        let resolved = match origin::resolve_url(&canonical, req.headers(), &self.config.forwarded)
        {
            Ok(url) => url,
            Err(error) => {
                tracing::debug!(request_id = %ctx.request_id, %error, "asserted header rejected");
                return error_response(StatusCode::BAD_REQUEST, &error.to_string());
            }
        };

        let req = if resolved != canonical {
            match request::rebind(req, &resolved) {
                Ok(rebound) => rebound,
                Err(error) => {
                    tracing::error!(request_id = %ctx.request_id, %error, "failed to rebind request");
                    return error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "resolved URL is not a valid request target",
                    );
                }
            }
        } else {
            req
        };

        // The configured address header must be on the request before the
        // application ever runs; its absence is a deployment problem.
        let address_header_value = match self.address_header_value(&req) {
            Ok(value) => value,
            Err(error) => {
                tracing::error!(request_id = %ctx.request_id, %error, "trusted address header missing");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string());
            }
        };

        let request_ctx = RequestContext::new(
            self.config.clone(),
            address_header_value,
            Platform {
                remote_addr: ctx.remote_addr,
                request_id: ctx.request_id,
            },
        );

        self.app.respond(req, request_ctx).await
    }

    fn address_header_value(&self, req: &Request<Body>) -> Result<Option<String>, AddressError> {
        match &self.config.forwarded.address_header {
            Some(header) => match req.headers().get(header.as_str()) {
                Some(value) => Ok(Some(
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )),
                None => Err(AddressError::HeaderMissing {
                    var: self.config.env_name("ADDRESS_HEADER"),
                    header: header.clone(),
                }),
            },
            None => Ok(None),
        }
    }
}

impl Handler for SsrHandler {
    fn name(&self) -> &'static str {
        "ssr"
    }

    fn call<'a>(&'a self, req: Request<Body>, ctx: &'a ConnectionContext) -> BoxFuture<'a, Step> {
        Box::pin(async move { Step::Respond(self.respond(req, ctx).await) })
    }
}
