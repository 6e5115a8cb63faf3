//! Admin authentication middleware.
//!
//! The env var named by `config.admin.token_env` (default `ZW_ADMIN_TOKEN`)
//! is read once at startup and its SHA-256 digest cached in `AppState`.
//! When set, admin requests must carry `Authorization: Bearer <token>`;
//! when unset the endpoints are open.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

pub async fn require_admin_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected_hash) = &state.admin_token_hash else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    // Compare fixed-length digests in constant time.
    let provided_hash = Sha256::digest(provided.as_bytes());
    if !bool::from(provided_hash.ct_eq(expected_hash.as_slice())) {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({ "error": "invalid or missing admin token" })),
        )
            .into_response();
    }

    next.run(req).await
}
