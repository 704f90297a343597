//! Shared utilities for integration testing.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use ssr_gateway::app::{AppServer, BoxError, BuildManifest, RequestContext};
use ssr_gateway::lifecycle::Shutdown;
use ssr_gateway::ws::{ServerSocket, SocketFn, WebSocketCapability};
use ssr_gateway::{Gateway, GatewayConfig};

/// How the mock application answers the websocket probe.
#[allow(dead_code)]
#[derive(Clone, Copy)]
pub enum WsMode {
    None,
    Echo,
    FailDiscovery,
}

/// Mock application server: the probe handler for dispatch assertions.
pub struct TestApp {
    pub calls: AtomicU32,
    pub seen_uri: Mutex<Option<String>>,
    ws: WsMode,
}

impl TestApp {
    pub fn new() -> Arc<Self> {
        Self::with_ws(WsMode::None)
    }

    pub fn with_ws(ws: WsMode) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            seen_uri: Mutex::new(None),
            ws,
        })
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AppServer for TestApp {
    fn respond(&self, req: Request<Body>, ctx: RequestContext) -> BoxFuture<'static, Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_uri.lock().unwrap() = Some(req.uri().to_string());

        let address = ctx.client_address();
        Box::pin(async move {
            match address {
                Ok(address) => (StatusCode::OK, format!("ssr:{}", address)).into_response(),
                Err(error) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
                }
            }
        })
    }

    fn websocket(&self) -> Result<Option<WebSocketCapability>, BoxError> {
        match self.ws {
            WsMode::None => Ok(None),
            WsMode::Echo => Ok(Some(WebSocketCapability::new(Arc::new(SocketFn(echo_socket))))),
            WsMode::FailDiscovery => Err("hook registry exploded".into()),
        }
    }
}

/// Echo frames back until the peer goes away.
async fn echo_socket(mut socket: ServerSocket) {
    while let Some(Ok(message)) = socket.next().await {
        if message.is_text() || message.is_binary() {
            if socket.send(message).await.is_err() {
                break;
            }
        }
    }
}

/// A gateway running on an ephemeral port; shuts down on drop.
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    #[allow(dead_code)]
    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a gateway for the given configuration and mock application.
pub async fn spawn_gateway(
    config: GatewayConfig,
    manifest: BuildManifest,
    app: Arc<TestApp>,
) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.wait();
    let gateway = Gateway::new(config, manifest, app);

    tokio::spawn(async move {
        let _ = gateway.run_until(listener, signal).await;
    });

    TestGateway { addr, shutdown }
}

/// Lay out a build directory: paths are relative ("client/app.js").
pub fn write_build(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }
    dir
}

/// Config pointed at a build directory, with defaults otherwise.
pub fn config_for(build_dir: &Path) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.paths.build_dir = build_dir.to_path_buf();
    config
}

/// Non-pooling client so each request sees a fresh connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Send a raw HTTP/1.1 request and return whatever arrives within the
/// timeout. Needed where a real client would refuse to send the headers
/// under test (connection/upgrade are hop-by-hop).
#[allow(dead_code)]
pub async fn raw_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut collected = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match tokio::time::timeout(Duration::from_millis(500), stream.read(&mut buf)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                collected.extend_from_slice(&buf[..n]);
                if String::from_utf8_lossy(&collected).contains("\r\n\r\n") {
                    break;
                }
            }
            _ => break,
        }
    }

    String::from_utf8_lossy(&collected).into_owned()
}
