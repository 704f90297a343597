//! HTTP server setup and the per-request entry point.
//!
//! # Responsibilities
//! - Build the dispatch chain and the WebSocket gate once at startup
//! - Create the axum Router with a catch-all route (no routing table at
//!   this layer; triage is the chain's job)
//! - Wire up middleware (HTTP tracing) and connect info
//! - Serve with graceful shutdown
//!
//! # Request path
//! gate first, chain second, one metrics sample per request.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderValue, Request};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::app::{AppServer, BuildManifest};
use crate::config::GatewayConfig;
use crate::dispatch::DispatchChain;
use crate::http::request::{ConnectionContext, RequestId, X_REQUEST_ID};
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::ws::{Gated, WebSocketGate};

/// State shared by every request.
#[derive(Clone)]
struct GatewayState {
    chain: Arc<DispatchChain>,
    gate: Arc<WebSocketGate>,
}

/// The deployable server for one framework build.
pub struct Gateway {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl Gateway {
    /// Assemble the gateway: dispatch chain, WebSocket gate, router.
    ///
    /// Everything configurable is decided here, once; request handling
    /// reads shared immutable state only.
    pub fn new(config: GatewayConfig, manifest: BuildManifest, app: Arc<dyn AppServer>) -> Self {
        let config = Arc::new(config);

        let chain = Arc::new(DispatchChain::for_build(&config, &manifest, app.clone()));
        let gate = Arc::new(WebSocketGate::discover(app.as_ref()));

        let state = GatewayState { chain, gate };
        let router = Self::build_router(state);

        Self { router, config }
    }

    /// Build the axum router. One catch-all entry answers every path and
    /// method.
    fn build_router(state: GatewayState) -> Router {
        Router::new()
            .route("/{*path}", any(entry))
            .route("/", any(entry))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run until the process receives a shutdown signal.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, signals::shutdown_signal()).await
    }

    /// Run until `signal` resolves. Embedders and tests pass their own
    /// coordinator (see [`crate::lifecycle::Shutdown::wait`]).
    pub async fn run_until<F>(self, listener: TcpListener, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "gateway starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Per-request entry point: WebSocket gate first, then the dispatch chain.
async fn entry(
    State(state): State<GatewayState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    req: Request<Body>,
) -> Response {
    let start = Instant::now();
    let request_id = RequestId::from_headers(req.headers());
    let method = req.method().to_string();

    let ctx = ConnectionContext {
        remote_addr: Some(remote),
        request_id,
    };

    let mut response = match state.gate.screen(req, &ctx).await {
        Gated::Upgrade(response) => response,
        Gated::Pass(req) => state.chain.dispatch(req, &ctx).await,
    };

    metrics::record_request(&method, response.status().as_u16(), start);

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    response
}
