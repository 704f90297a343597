//! Lifecycle management.
//!
//! Startup is plain and ordered (config → logging → metrics → listener →
//! serve); these modules cover the other end: a broadcast shutdown
//! coordinator for embedders and the process signal handler the binary
//! uses.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
