//! Request identity and the request cloner.
//!
//! # Responsibilities
//! - Tag every request with an ID for tracing (reusing an upstream
//!   `x-request-id` when one arrives)
//! - Carry transport metadata alongside the request (remote address)
//! - Rebind a request to a rewritten URL without touching its body
//!
//! # Design Decisions
//! - The cloner moves the header map and body instead of copying them; the
//!   body stream stays unread and consumable exactly once downstream
//! - Rebinding is only invoked when resolution actually changed the URL

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::uri::InvalidUri;
use axum::http::{HeaderMap, Request, Uri};
use url::Url;
use uuid::Uuid;

/// Header used for request correlation across proxies.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Unique identifier for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a fresh ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse the upstream proxy's `x-request-id` when it is one of ours,
    /// otherwise generate a fresh ID.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .map(Self)
            .unwrap_or_else(Self::new)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport-side facts about the connection a request arrived on.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    /// Peer address as seen by this process (a proxy, in production).
    pub remote_addr: Option<SocketAddr>,
    /// Correlation ID for this request.
    pub request_id: RequestId,
}

/// Produce an equivalent request bound to `url`.
///
/// Method, headers, version, extensions and the unread body all move into
/// the new request; only the target changes. Fragments are dropped: they
/// are a client-side concept and have no place in a request target.
pub fn rebind(req: Request<Body>, url: &Url) -> Result<Request<Body>, InvalidUri> {
    let mut target = url.clone();
    target.set_fragment(None);
    let uri = Uri::try_from(target.as_str())?;

    let (mut parts, body) = req.into_parts();
    parts.uri = uri;
    Ok(Request::from_parts(parts, body))
}
