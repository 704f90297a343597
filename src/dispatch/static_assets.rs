//! Static asset responders.
//!
//! # Responsibilities
//! - Serve the client and prerendered roots through the file-serving
//!   capability (`tower_http::services::ServeDir`)
//! - Decline, rather than error, whenever a request cannot be answered
//!   from disk
//! - Attach long-lived caching to the build's immutable asset prefix
//!
//! # Design Decisions
//! - Probing uses an empty-body copy of the request so the original body
//!   is never consumed by a link that may decline
//! - Extensionless paths retry with `.html` appended, matching how the
//!   build phase lays out prerendered pages
//! - File-serving mechanics (ranges, conditional requests, precompressed
//!   negotiation) are ServeDir's problem, not ours

use std::collections::HashSet;
use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use axum::response::Response;
use futures_util::future::BoxFuture;
use tower_http::services::ServeDir;

use crate::app::BuildManifest;
use crate::config::AssetsConfig;
use crate::dispatch::handler::{Handler, Step};
use crate::http::request::ConnectionContext;

const IMMUTABLE_CACHE: HeaderValue =
    HeaderValue::from_static("public,max-age=31536000,immutable");

/// A fallback-capable responder over one static root.
pub struct StaticHandler {
    name: &'static str,
    serve: ServeDir,
    /// Paths under this prefix get the immutable cache directive.
    immutable_prefix: Option<String>,
    /// When present, only paths in this set are eligible at all.
    prerendered: Option<HashSet<String>>,
}

impl StaticHandler {
    /// Responder for the client asset root. `None` when the root is absent,
    /// so the chain can be built without it.
    pub fn client(
        root: PathBuf,
        manifest: &BuildManifest,
        assets: &AssetsConfig,
    ) -> Option<Self> {
        if !root.is_dir() {
            return None;
        }
        Some(Self {
            name: "static-client",
            serve: serve_dir(root, assets),
            immutable_prefix: Some(manifest.immutable_prefix()),
            prerendered: None,
        })
    }

    /// Responder for the prerendered page root. `None` when the root is
    /// absent or the build prerendered nothing.
    pub fn prerendered(
        root: PathBuf,
        manifest: &BuildManifest,
        assets: &AssetsConfig,
    ) -> Option<Self> {
        if !root.is_dir() || manifest.prerendered.is_empty() {
            return None;
        }
        Some(Self {
            name: "static-prerendered",
            serve: serve_dir(root, assets),
            immutable_prefix: None,
            prerendered: Some(manifest.prerendered.clone()),
        })
    }

    async fn probe(&self, method: &Method, headers: &HeaderMap, uri: &Uri) -> Option<Response> {
        if let Some(response) = self.try_serve(method, headers, uri, uri.clone()).await {
            return Some(response);
        }
        if let Some(variant) = html_variant(uri) {
            return self.try_serve(method, headers, uri, variant).await;
        }
        None
    }

    async fn try_serve(
        &self,
        method: &Method,
        headers: &HeaderMap,
        orig_uri: &Uri,
        uri: Uri,
    ) -> Option<Response> {
        let mut probe = Request::new(Body::empty());
        *probe.method_mut() = method.clone();
        *probe.uri_mut() = uri;
        *probe.headers_mut() = headers.clone();

        let mut serve = self.serve.clone();
        match serve.try_call(probe).await {
            Ok(response) if response.status() == StatusCode::NOT_FOUND => None,
            Ok(response) => Some(self.finish(orig_uri.path(), response.map(Body::new))),
            Err(error) => {
                tracing::debug!(handler = self.name, %error, "static probe failed");
                None
            }
        }
    }

    fn finish(&self, path: &str, mut response: Response) -> Response {
        if let Some(prefix) = &self.immutable_prefix {
            if path.starts_with(prefix.as_str()) {
                response
                    .headers_mut()
                    .insert(header::CACHE_CONTROL, IMMUTABLE_CACHE);
            }
        }
        response
    }
}

impl Handler for StaticHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    fn call<'a>(&'a self, req: Request<Body>, _ctx: &'a ConnectionContext) -> BoxFuture<'a, Step> {
        Box::pin(async move {
            if req.method() != Method::GET && req.method() != Method::HEAD {
                return Step::Continue(req);
            }

            if let Some(eligible) = &self.prerendered {
                if !eligible.contains(page_path(req.uri().path())) {
                    return Step::Continue(req);
                }
            }

            match self.probe(req.method(), req.headers(), req.uri()).await {
                Some(response) => Step::Respond(response),
                None => Step::Continue(req),
            }
        })
    }
}

fn serve_dir(root: PathBuf, assets: &AssetsConfig) -> ServeDir {
    let mut serve = ServeDir::new(root);
    if assets.gzip {
        serve = serve.precompressed_gzip();
    }
    if assets.brotli {
        serve = serve.precompressed_br();
    }
    serve
}

/// Page identity for the prerendered set: trailing slashes collapse, the
/// root stays itself.
fn page_path(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

/// `/about` → `/about.html`, but never for paths that already name a file
/// or end in a slash.
fn html_variant(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    if path.ends_with('/') {
        return None;
    }
    let last = path.rsplit('/').next().unwrap_or("");
    if last.is_empty() || last.contains('.') {
        return None;
    }

    let target = match uri.query() {
        Some(query) => format!("{}.html?{}", path, query),
        None => format!("{}.html", path),
    };
    target.parse().ok()
}
