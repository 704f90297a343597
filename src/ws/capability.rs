//! The discoverable WebSocket capability.
//!
//! A build that wants WebSocket traffic declares this through
//! `AppServer::websocket()`: an explicit, versioned extension point on the
//! server contract, not an afterthought bolted onto generated code.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::http::request::ConnectionContext;
use crate::ws::protocol::{self, ServerSocket, UpgradeError};

/// Drives an accepted socket until the peer goes away.
pub trait SocketHandler: Send + Sync {
    fn serve(&self, socket: ServerSocket) -> BoxFuture<'static, ()>;
}

/// Newtype adapter turning a plain async function into a socket handler.
pub struct SocketFn<F>(pub F);

impl<F, Fut> SocketHandler for SocketFn<F>
where
    F: Fn(ServerSocket) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn serve(&self, socket: ServerSocket) -> BoxFuture<'static, ()> {
        Box::pin((self.0)(socket))
    }
}

/// Custom handshake routine, for builds that negotiate subprotocols or
/// reject upgrades on their own terms.
pub trait UpgradeHandler: Send + Sync {
    fn upgrade(
        &self,
        req: Request<Body>,
        ctx: &ConnectionContext,
    ) -> BoxFuture<'static, Result<Response, UpgradeError>>;
}

/// WebSocket capability declared by an application build.
pub struct WebSocketCapability {
    upgrade: Option<Box<dyn UpgradeHandler>>,
    socket: Arc<dyn SocketHandler>,
}

impl WebSocketCapability {
    /// Capability that accepts upgrades with the default protocol-level
    /// handshake and drives sockets with `socket`.
    pub fn new(socket: Arc<dyn SocketHandler>) -> Self {
        Self {
            upgrade: None,
            socket,
        }
    }

    /// Replace the default handshake with a custom upgrade routine.
    pub fn with_upgrade(mut self, upgrade: Box<dyn UpgradeHandler>) -> Self {
        self.upgrade = Some(upgrade);
        self
    }

    /// Answer a qualifying upgrade request.
    pub async fn handle(
        &self,
        req: Request<Body>,
        ctx: &ConnectionContext,
    ) -> Result<Response, UpgradeError> {
        match &self.upgrade {
            Some(custom) => custom.upgrade(req, ctx).await,
            None => protocol::accept(req, self.socket.clone()),
        }
    }
}
