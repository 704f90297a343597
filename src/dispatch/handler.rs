//! The fallback-capable handler contract.

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::http::request::ConnectionContext;

/// Outcome of one link in the dispatch chain.
///
/// Ownership makes the fallback protocol airtight: a handler either keeps
/// the request and must respond, or gives it back and cannot.
pub enum Step {
    /// The handler produced the final response; dispatch ends.
    Respond(Response),
    /// The handler declined; the request continues to the next link.
    Continue(Request<Body>),
}

/// A capability that answers a request or defers to the next handler.
pub trait Handler: Send + Sync {
    /// Label used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Handle one request.
    fn call<'a>(&'a self, req: Request<Body>, ctx: &'a ConnectionContext) -> BoxFuture<'a, Step>;
}
