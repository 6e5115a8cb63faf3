//! Minimal `Cookie` / `Set-Cookie` handling for the session cookie.

use std::fmt;

/// Default name of the cookie carrying the session id.
pub const SESSION_COOKIE_NAME: &str = "app_session_id";

/// Find `name` in a `Cookie` request header value (`a=1; b=2`).
///
/// Malformed pairs and empty values are skipped.
pub fn find_cookie<'a>(header_value: &'a str, name: &str) -> Option<&'a str> {
    header_value
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim().trim_matches('"')))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v)
}

/// A `Set-Cookie` response header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub http_only: bool,
}

impl SetCookie {
    pub fn session(value: impl Into<String>) -> Self {
        Self {
            name: SESSION_COOKIE_NAME.into(),
            value: value.into(),
            path: "/".into(),
            http_only: true,
        }
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}; Path={}", self.name, self.value, self.path)?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        f.write_str("; SameSite=Lax")
    }
}
