//! Ordered fallback dispatch.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::app::{AppServer, BuildManifest};
use crate::config::GatewayConfig;
use crate::dispatch::handler::{Handler, Step};
use crate::dispatch::ssr::SsrHandler;
use crate::dispatch::static_assets::StaticHandler;
use crate::http::request::ConnectionContext;
use crate::http::response;
use crate::observability::metrics;

/// The ordered sequence of fallback-capable handlers.
///
/// Built once at process start; immutable afterwards, so concurrent
/// requests share it without synchronization.
pub struct DispatchChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl DispatchChain {
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { handlers }
    }

    /// Assemble the chain for a build: static client assets, prerendered
    /// pages, then the SSR responder as the terminal link.
    ///
    /// Static links are dropped when assets are disabled or their root is
    /// absent on disk, so request-time dispatch never probes a directory
    /// that cannot answer.
    pub fn for_build(
        config: &Arc<GatewayConfig>,
        manifest: &BuildManifest,
        app: Arc<dyn AppServer>,
    ) -> Self {
        let mut handlers: Vec<Arc<dyn Handler>> = Vec::new();

        if config.assets.enabled {
            let client_root = config.paths.client_root();
            match StaticHandler::client(client_root.clone(), manifest, &config.assets) {
                Some(handler) => {
                    tracing::info!(root = %client_root.display(), "serving client assets");
                    handlers.push(Arc::new(handler));
                }
                None => {
                    tracing::debug!(root = %client_root.display(), "client asset root absent");
                }
            }

            let prerendered_root = config.paths.prerendered_root();
            match StaticHandler::prerendered(prerendered_root.clone(), manifest, &config.assets) {
                Some(handler) => {
                    tracing::info!(
                        root = %prerendered_root.display(),
                        pages = manifest.prerendered.len(),
                        "serving prerendered pages"
                    );
                    handlers.push(Arc::new(handler));
                }
                None => {
                    tracing::debug!(root = %prerendered_root.display(), "no prerendered pages");
                }
            }
        }

        handlers.push(Arc::new(SsrHandler::new(app, config.clone())));

        Self::new(handlers)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the chain for one request.
    ///
    /// Handlers run strictly in order, one at a time; the first response
    /// wins. Exhaustion yields a plain 404.
    pub async fn dispatch(&self, mut req: Request<Body>, ctx: &ConnectionContext) -> Response {
        for handler in &self.handlers {
            match handler.call(req, ctx).await {
                Step::Respond(response) => {
                    tracing::trace!(
                        request_id = %ctx.request_id,
                        handler = handler.name(),
                        status = %response.status(),
                        "request answered"
                    );
                    metrics::record_dispatch(handler.name(), response.status().as_u16());
                    return response;
                }
                Step::Continue(declined) => req = declined,
            }
        }

        metrics::record_dispatch("none", 404);
        response::not_found()
    }
}
