//! Runtime gateway for a framework-produced server build.
//!
//! Serves one build directory as a single process: static client assets and
//! prerendered pages are tried first, with server-side rendering as the
//! terminal fallback. Trusted reverse-proxy headers resolve the canonical
//! request URL and the logical client address, and WebSocket upgrades are
//! intercepted before the dispatch chain when the build declares a
//! capability for them.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod proxy;
pub mod ws;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use app::{AppServer, BuildManifest, Platform, RequestContext};
pub use config::GatewayConfig;
pub use dispatch::{DispatchChain, Handler, Step};
pub use http::Gateway;
pub use lifecycle::Shutdown;
pub use ws::WebSocketCapability;
