//! Process-wide request machinery: sequence numbers, the session
//! registry, the optional diagnostic recorder and cookie settings.
//!
//! Tests build as many independent runtimes as they like; the binary
//! installs exactly one with [`install_global`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use zw_domain::config::{Config, DiagnosticSinkKind};
use zw_domain::error::{Error, Result};
use zw_sessions::{SessionRegistry, SetCookie, SESSION_COOKIE_NAME};

use crate::diagnostics::{DiagnosticRecorder, StdoutSink, TracingSink};

static GLOBAL: OnceLock<Arc<WebRuntime>> = OnceLock::new();

pub struct WebRuntime {
    next_seq: AtomicU64,
    registry: Option<Arc<SessionRegistry>>,
    diagnostics: Option<DiagnosticRecorder>,
    cookie_name: String,
    cookie_path: String,
    cookie_http_only: bool,
    max_body_bytes: usize,
}

impl Default for WebRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl WebRuntime {
    /// A runtime with a fresh registry and diagnostics off.
    pub fn new() -> Self {
        Self {
            next_seq: AtomicU64::new(0),
            registry: Some(Arc::new(SessionRegistry::new())),
            diagnostics: None,
            cookie_name: SESSION_COOKIE_NAME.into(),
            cookie_path: "/".into(),
            cookie_http_only: true,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let registry = config
            .sessions
            .enabled
            .then(|| Arc::new(SessionRegistry::new()));

        let diag = &config.diagnostics;
        let diagnostics = diag.enabled.then(|| {
            let recorder = match diag.sink {
                DiagnosticSinkKind::Stdout => DiagnosticRecorder::new(StdoutSink),
                DiagnosticSinkKind::Tracing => DiagnosticRecorder::new(TracingSink),
            };
            recorder
                .verbose(diag.verbose)
                .preview_chars(diag.preview_chars)
        });

        Self {
            next_seq: AtomicU64::new(0),
            registry,
            diagnostics,
            cookie_name: config.sessions.cookie_name.clone(),
            cookie_path: config.sessions.cookie_path.clone(),
            cookie_http_only: config.sessions.http_only,
            max_body_bytes: config.server.max_body_bytes,
        }
    }

    pub fn with_registry(mut self, registry: Option<Arc<SessionRegistry>>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_diagnostics(mut self, recorder: DiagnosticRecorder) -> Self {
        self.diagnostics = Some(recorder);
        self
    }

    pub fn with_max_body_bytes(mut self, n: usize) -> Self {
        self.max_body_bytes = n;
        self
    }

    /// Next request sequence number, starting at 1.
    pub fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn registry(&self) -> Option<&SessionRegistry> {
        self.registry.as_deref()
    }

    pub fn diagnostics(&self) -> Option<&DiagnosticRecorder> {
        self.diagnostics.as_ref()
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// The `Set-Cookie` telling a client its new session id.
    pub fn session_cookie(&self, id: &str) -> SetCookie {
        SetCookie {
            name: self.cookie_name.clone(),
            value: id.to_owned(),
            path: self.cookie_path.clone(),
            http_only: self.cookie_http_only,
        }
    }
}

/// Install the process runtime.  Only the first call succeeds.
pub fn install_global(runtime: Arc<WebRuntime>) -> Result<Arc<WebRuntime>> {
    GLOBAL
        .set(runtime.clone())
        .map_err(|_| Error::Config("web runtime already installed".into()))?;
    Ok(runtime)
}

/// The runtime installed by [`install_global`], if any.
pub fn global() -> Option<Arc<WebRuntime>> {
    GLOBAL.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_strictly_increasing() {
        let rt = WebRuntime::new();
        let a = rt.next_seq();
        let b = rt.next_seq();
        assert_eq!(a, 1);
        assert!(b > a);
    }

    #[test]
    fn runtimes_are_independent() {
        let a = WebRuntime::new();
        let b = WebRuntime::new();
        a.next_seq();
        a.next_seq();
        assert_eq!(b.next_seq(), 1);
    }

    #[test]
    fn from_config_honours_switches() {
        let mut config = Config::default();
        config.sessions.enabled = false;
        config.diagnostics.enabled = true;
        let rt = WebRuntime::from_config(&config);
        assert!(rt.registry().is_none());
        assert!(rt.diagnostics().is_some());

        let rt = WebRuntime::from_config(&Config::default());
        assert!(rt.registry().is_some());
        assert!(rt.diagnostics().is_none());
    }

    #[test]
    fn session_cookie_uses_configured_name() {
        let mut config = Config::default();
        config.sessions.cookie_name = "sid".into();
        config.sessions.http_only = false;
        let rt = WebRuntime::from_config(&config);
        assert_eq!(rt.session_cookie("v").to_string(), "sid=v; Path=/; SameSite=Lax");
    }

    #[test]
    fn global_installs_once() {
        let first = Arc::new(WebRuntime::new());
        // Another test binary thread may have installed already; either
        // way a second install must fail.
        let _ = install_global(first);
        assert!(global().is_some());
        assert!(install_global(Arc::new(WebRuntime::new())).is_err());
    }
}
