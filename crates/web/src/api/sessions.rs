//! Session registry introspection.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

/// GET /v1/sessions: every live session, oldest first, id prefixes only.
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    match state.runtime.registry() {
        Some(registry) => {
            let sessions = registry.snapshot();
            Json(serde_json::json!({
                "enabled": true,
                "count": sessions.len(),
                "sessions": sessions,
            }))
        }
        None => Json(serde_json::json!({
            "enabled": false,
            "count": 0,
            "sessions": [],
        })),
    }
}
