//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via tracing; one diagnostic line per request only
//!   when explicitly enabled (it lives in the SSR responder)
//! - Metrics are cheap label increments; the Prometheus endpoint is
//!   opt-in and runs on its own listener

pub mod logging;
pub mod metrics;
