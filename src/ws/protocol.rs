//! Default protocol-level upgrade.
//!
//! Completes the WebSocket handshake on the current connection: derive the
//! accept key, answer 101, and hand the upgraded byte stream to the
//! capability's socket handler on its own task.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use hyper::upgrade::{OnUpgrade, Upgraded};
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio_tungstenite::tungstenite::handshake::derive_accept_key;
use tokio_tungstenite::tungstenite::protocol::Role;
use tokio_tungstenite::WebSocketStream;

use crate::ws::capability::SocketHandler;

/// Server half of an accepted WebSocket connection.
pub type ServerSocket = WebSocketStream<TokioIo<Upgraded>>;

/// Request-scoped upgrade failures.
#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("upgrade request is missing sec-websocket-key")]
    MissingKey,

    #[error("connection cannot be upgraded")]
    NotUpgradable,

    #[error("upgrade handler failed: {0}")]
    Handler(String),
}

/// Accept the handshake and spawn the socket task.
///
/// The 101 goes back on the HTTP path; the upgraded stream is driven by
/// `handler` until the peer goes away. A failed transport upgrade after
/// the 101 only costs this connection.
pub fn accept(
    mut req: Request<Body>,
    handler: Arc<dyn SocketHandler>,
) -> Result<Response, UpgradeError> {
    let key = req
        .headers()
        .get(header::SEC_WEBSOCKET_KEY)
        .ok_or(UpgradeError::MissingKey)?;
    let accept_key = derive_accept_key(key.as_bytes());

    let on_upgrade = req
        .extensions_mut()
        .remove::<OnUpgrade>()
        .ok_or(UpgradeError::NotUpgradable)?;

    tokio::spawn(async move {
        match on_upgrade.await {
            Ok(upgraded) => {
                let socket =
                    WebSocketStream::from_raw_socket(TokioIo::new(upgraded), Role::Server, None)
                        .await;
                handler.serve(socket).await;
            }
            Err(error) => {
                tracing::error!(%error, "websocket transport upgrade failed");
            }
        }
    });

    Ok(Response::builder()
        .status(StatusCode::SWITCHING_PROTOCOLS)
        .header(header::CONNECTION, "upgrade")
        .header(header::UPGRADE, "websocket")
        .header(header::SEC_WEBSOCKET_ACCEPT, accept_key)
        .body(Body::empty())
        .expect("static 101 response"))
}
