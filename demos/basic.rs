//! Minimal embedding: a tiny application server behind the gateway.
//!
//! Run with `cargo run --example basic`, then:
//!   curl http://127.0.0.1:3000/anything
//!   websocat ws://127.0.0.1:3000/live

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;

use ssr_gateway::app::{AppServer, BoxError, BuildManifest, RequestContext};
use ssr_gateway::ws::{ServerSocket, SocketFn, WebSocketCapability};
use ssr_gateway::{observability, Gateway, GatewayConfig};

struct HelloApp;

impl AppServer for HelloApp {
    fn respond(&self, req: Request<Body>, ctx: RequestContext) -> BoxFuture<'static, Response> {
        let path = req.uri().path().to_string();
        let address = ctx.client_address();

        Box::pin(async move {
            let who = address.unwrap_or_else(|_| "unknown".to_string());
            (StatusCode::OK, format!("hello {} from {}\n", who, path)).into_response()
        })
    }

    fn websocket(&self) -> Result<Option<WebSocketCapability>, BoxError> {
        Ok(Some(WebSocketCapability::new(Arc::new(SocketFn(echo)))))
    }
}

async fn echo(mut socket: ServerSocket) {
    while let Some(Ok(message)) = socket.next().await {
        if message.is_text() || message.is_binary() {
            if socket.send(message).await.is_err() {
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig::default();
    observability::logging::init(&config.observability);

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    println!("demo gateway on http://{}", listener.local_addr()?);

    Gateway::new(config, BuildManifest::default(), Arc::new(HelloApp))
        .run(listener)
        .await?;

    Ok(())
}
