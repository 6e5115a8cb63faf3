use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cookie-bound session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// When `false` no registry is configured and every request runs
    /// without a session.
    #[serde(default = "d_true")]
    pub enabled: bool,

    /// Name of the cookie carrying the session id.
    #[serde(default = "d_cookie_name")]
    pub cookie_name: String,

    /// `Path` attribute of the issued cookie.
    #[serde(default = "d_cookie_path")]
    pub cookie_path: String,

    /// Mark the issued cookie `HttpOnly`.
    #[serde(default = "d_true")]
    pub http_only: bool,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cookie_name: d_cookie_name(),
            cookie_path: d_cookie_path(),
            http_only: true,
        }
    }
}

fn d_true() -> bool {
    true
}
fn d_cookie_name() -> String {
    "app_session_id".into()
}
fn d_cookie_path() -> String {
    "/".into()
}
