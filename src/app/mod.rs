//! The application server contract.
//!
//! This is the boundary to the framework build being served: a trait the
//! bundled application implements (`AppServer`), the context handed to it
//! per request (`RequestContext`, `Platform`), and the build manifest the
//! build phase bakes next to the assets.

pub mod manifest;
pub mod preview;
pub mod server;

pub use manifest::{BuildManifest, ManifestError};
pub use preview::StaticPreview;
pub use server::{AppServer, BoxError, Platform, RequestContext};
