//! Placeholder application server for previewing a build.
//!
//! The shipped binary has no application linked in; this responder fills
//! the terminal slot of the chain so a build's static output can be
//! smoke-tested. It honors the contract: it always answers.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::app::server::{AppServer, RequestContext};
use crate::http::response::error_response;

pub struct StaticPreview;

impl AppServer for StaticPreview {
    fn respond(&self, req: Request<Body>, ctx: RequestContext) -> BoxFuture<'static, Response> {
        let path = req.uri().path().to_string();
        let address = ctx.client_address();

        Box::pin(async move {
            let address = match address {
                Ok(address) => address,
                Err(error) => {
                    return error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
                }
            };

            tracing::debug!(%path, client = %address, "preview fallback");
            (
                StatusCode::NOT_FOUND,
                format!(
                    "{} was not prerendered and no application server is linked into this preview\n",
                    path
                ),
            )
                .into_response()
        })
    }
}
