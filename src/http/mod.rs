//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, catch-all route, connect info)
//!     → ws gate (upgrade interception, before anything else)
//!     → dispatch chain (static assets → prerendered → ssr)
//!     → response back to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{rebind, ConnectionContext, RequestId, X_REQUEST_ID};
pub use server::Gateway;
