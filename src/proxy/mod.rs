//! Trusted reverse-proxy header resolution.
//!
//! # Data Flow
//! ```text
//! Incoming request (URI, headers, transport)
//!     → origin.rs: canonical URL, then origin override or
//!       host/protocol header rewrite
//!     → address.rs: logical client address from the configured
//!       trusted header, the transport, or the fallback
//! ```
//!
//! # Design Decisions
//! - Nothing here trusts a header implicitly: each header is consulted only
//!   when its name appears in the configuration
//! - Both halves are pure functions of (request facts, config) so resolving
//!   the same request twice gives the same answer
//! - URL resolution runs once per request in the SSR responder; address
//!   resolution runs lazily, only when the application asks

pub mod address;
pub mod origin;

pub use address::AddressError;
pub use origin::ResolveError;
