//! Running context-based handlers under axum.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use zw_domain::error::Error;

use crate::context::RequestContext;
use crate::runtime::WebRuntime;
use crate::transport::AxumTransport;

/// A request handler working on a [`RequestContext`].
///
/// Handlers reply through the context.  Returning without a reply sends
/// an empty `200 OK`; returning an error sends a `500` unless a reply
/// already went out.  An oversized request body
/// ([`Error::PayloadTooLarge`]) becomes a `413`.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, ctx: &mut RequestContext<AxumTransport>) -> anyhow::Result<()>;
}

/// Build a context for `request`, run `handler` on it and turn the
/// outcome into a response.
pub async fn dispatch(
    runtime: Arc<WebRuntime>,
    handler: Arc<dyn Handler>,
    request: Request,
) -> Response {
    let transport = AxumTransport::new(request, runtime.max_body_bytes());
    let mut ctx = RequestContext::new(runtime, transport).await;

    if let Err(e) = handler.handle(&mut ctx).await {
        let status = match e.downcast_ref::<Error>() {
            Some(Error::PayloadTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(seq = ctx.seq(), error = %e, "handler failed");
        } else {
            tracing::warn!(seq = ctx.seq(), error = %e, "request rejected");
        }
        if !ctx.is_replied() {
            let reason = status.canonical_reason().unwrap_or("error");
            ctx.reply_with_status(status, reason.to_ascii_lowercase(), "txt");
        }
    }

    ctx.into_transport().into_response()
}
