//! Canonical URL resolution.
//!
//! A process behind a reverse proxy binds to an address the outside world
//! never sees. The externally visible scheme and host come either from a
//! configured origin override or from headers asserted by the trusted
//! upstream proxy; the path and query always come from the request itself.

use axum::http::{header, HeaderMap, Uri};
use thiserror::Error;
use url::Url;

use crate::config::ForwardedConfig;

/// Failure to derive a usable URL for a request.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("request target {0:?} cannot be resolved to a URL")]
    BadTarget(String),

    #[error("configured origin {0:?} is not an absolute URL")]
    BadOrigin(String),

    #[error("asserted host {0:?} is not a valid authority")]
    BadHost(String),

    #[error("asserted protocol {0:?} is not a valid scheme")]
    BadScheme(String),
}

/// Reconstruct the URL of a request as this process received it.
///
/// Absolute-form targets carry their own authority (HTTP/2, some proxies);
/// origin-form targets borrow the `Host` header. The scheme is `http`: this
/// process only ever listens in plain text, and anything else is asserted
/// through [`resolve_url`].
pub fn canonical_url(uri: &Uri, headers: &HeaderMap) -> Result<Url, ResolveError> {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Url::parse(&uri.to_string()).map_err(|_| ResolveError::BadTarget(uri.to_string()));
    }

    let host = uri
        .authority()
        .map(|a| a.as_str())
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|value| value.to_str().ok())
        })
        .unwrap_or("localhost");

    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    Url::parse(&format!("http://{}{}", host, target))
        .map_err(|_| ResolveError::BadTarget(format!("{}{}", host, target)))
}

/// Apply the configured origin override or trusted host/protocol headers.
///
/// Resolution order:
/// 1. a configured `origin` wins outright: its scheme and host, the
///    request's path, query and fragment;
/// 2. otherwise a configured host/protocol header whose asserted value
///    differs from the canonical URL rewrites that component;
/// 3. otherwise the URL is returned unchanged.
pub fn resolve_url(
    canonical: &Url,
    headers: &HeaderMap,
    forwarded: &ForwardedConfig,
) -> Result<Url, ResolveError> {
    if let Some(origin) = &forwarded.origin {
        let mut resolved =
            Url::parse(origin).map_err(|_| ResolveError::BadOrigin(origin.clone()))?;
        resolved.set_path(canonical.path());
        resolved.set_query(canonical.query());
        resolved.set_fragment(canonical.fragment());
        return Ok(resolved);
    }

    let mut resolved = canonical.clone();

    if let Some(name) = &forwarded.host_header {
        if let Some(asserted) = header_str(headers, name) {
            if asserted != authority(&resolved) {
                set_authority(&mut resolved, asserted)?;
            }
        }
    }

    if let Some(name) = &forwarded.protocol_header {
        if let Some(asserted) = header_str(headers, name) {
            if asserted != resolved.scheme() {
                resolved
                    .set_scheme(asserted)
                    .map_err(|_| ResolveError::BadScheme(asserted.to_string()))?;
            }
        }
    }

    Ok(resolved)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Host plus explicit port, the form a `Host`-style header carries.
fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn set_authority(url: &mut Url, asserted: &str) -> Result<(), ResolveError> {
    let bad = || ResolveError::BadHost(asserted.to_string());

    let (host, port) = match asserted.rsplit_once(':') {
        Some((host, port))
            if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) =>
        {
            (host, Some(port.parse::<u16>().map_err(|_| bad())?))
        }
        _ => (asserted, None),
    };

    url.set_host(Some(host)).map_err(|_| bad())?;
    url.set_port(port).map_err(|_| bad())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded() -> ForwardedConfig {
        ForwardedConfig::default()
    }

    fn canonical(target: &str, host: &str) -> Url {
        let uri: Uri = target.parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_str(host).unwrap());
        canonical_url(&uri, &headers).unwrap()
    }

    #[test]
    fn canonical_url_from_host_header() {
        let url = canonical("/foo?x=1", "localhost:3000");
        assert_eq!(url.as_str(), "http://localhost:3000/foo?x=1");
    }

    #[test]
    fn origin_override_replaces_scheme_and_host() {
        let mut config = forwarded();
        config.origin = Some("https://example.com".to_string());

        let url = canonical("/foo?x=1", "localhost");
        let resolved = resolve_url(&url, &HeaderMap::new(), &config).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/foo?x=1");
    }

    #[test]
    fn host_header_rewrites_authority() {
        let mut config = forwarded();
        config.host_header = Some("x-forwarded-host".to_string());

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-host",
            HeaderValue::from_static("public.example:8443"),
        );

        let url = canonical("/a/b", "10.0.0.5:3000");
        let resolved = resolve_url(&url, &headers, &config).unwrap();
        assert_eq!(resolved.as_str(), "http://public.example:8443/a/b");
    }

    #[test]
    fn protocol_header_rewrites_scheme() {
        let mut config = forwarded();
        config.protocol_header = Some("x-forwarded-proto".to_string());

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

        let url = canonical("/", "example.com");
        let resolved = resolve_url(&url, &headers, &config).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/");
    }

    #[test]
    fn unconfigured_headers_leave_url_unchanged() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-host", HeaderValue::from_static("evil.example"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

        let url = canonical("/foo", "localhost:3000");
        let resolved = resolve_url(&url, &headers, &forwarded()).unwrap();
        assert_eq!(resolved, url);
    }

    #[test]
    fn matching_asserted_host_is_a_no_op() {
        let mut config = forwarded();
        config.host_header = Some("x-forwarded-host".to_string());

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-host", HeaderValue::from_static("example.com"));

        let url = canonical("/foo", "example.com");
        let resolved = resolve_url(&url, &headers, &config).unwrap();
        assert_eq!(resolved, url);
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut config = forwarded();
        config.origin = Some("https://example.com".to_string());

        let url = canonical("/foo?x=1", "localhost");
        let first = resolve_url(&url, &HeaderMap::new(), &config).unwrap();
        let second = resolve_url(&url, &HeaderMap::new(), &config).unwrap();
        assert_eq!(first, second);
    }
}
