pub mod auth;
pub mod demo;
pub mod sessions;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{any, get};
use axum::Router;

use crate::dispatch::{dispatch, Handler};
use crate::state::AppState;

type ResponseFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Adapt a context [`Handler`] into an axum handler.
pub fn with_context<H: Handler>(
    handler: H,
) -> impl Fn(State<AppState>, Request) -> ResponseFuture + Clone + Send + Sync + 'static {
    let handler: Arc<dyn Handler> = Arc::new(handler);
    move |State(state): State<AppState>, request: Request| {
        let handler = handler.clone();
        Box::pin(async move { dispatch(state.runtime.clone(), handler, request).await })
            as ResponseFuture
    }
}

/// Build the full router.
///
/// Site pages run through [`RequestContext`](crate::context::RequestContext);
/// the admin session listing is gated behind the admin bearer token.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/", get(with_context(demo::Home)))
        .route("/echo", any(with_context(demo::Echo)))
        .route("/settings/:name", any(with_context(demo::Setting)))
        .route("/back", get(with_context(demo::Back)))
        .fallback(with_context(demo::NotFound));

    let admin = Router::new()
        .route("/v1/sessions", get(sessions::list_sessions))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_admin_token,
        ));

    public.merge(admin)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
