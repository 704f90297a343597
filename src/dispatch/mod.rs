//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Request (already past the WebSocket gate)
//!     → chain.rs (ordered fallback iteration)
//!         → static_assets.rs: client root   (may decline)
//!         → static_assets.rs: prerendered   (may decline)
//!         → ssr.rs: application server      (always answers)
//!     → 404 only if the chain is exhausted
//! ```
//!
//! # Design Decisions
//! - The chain is built once at startup and never mutates at request time
//! - Declining hands the request to the next link by value, so a handler
//!   cannot defer twice and cannot answer after deferring
//! - Static links are omitted up front when assets are disabled or their
//!   root is missing, instead of declining on every request

pub mod chain;
pub mod handler;
pub mod ssr;
pub mod static_assets;

pub use chain::DispatchChain;
pub use handler::{Handler, Step};
pub use ssr::SsrHandler;
pub use static_assets::StaticHandler;
