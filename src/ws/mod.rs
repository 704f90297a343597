//! WebSocket upgrade interception.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     AppServer::websocket() probed once
//!     → capability present: gate armed
//!     → probe error: warn + gate disabled (fail open to plain HTTP)
//!
//! Per request:
//!     gate.rs header tests (connection: upgrade, upgrade: websocket)
//!     → qualifying: capability upgrade (custom or protocol.rs default),
//!       dispatch chain never runs
//!     → otherwise: request passes into the dispatch chain
//! ```

pub mod capability;
pub mod gate;
pub mod protocol;

pub use capability::{SocketFn, SocketHandler, UpgradeHandler, WebSocketCapability};
pub use gate::{Gated, WebSocketGate};
pub use protocol::{ServerSocket, UpgradeError};
