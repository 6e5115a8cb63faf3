//! Per-client session state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use zw_domain::error::Error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A bag of named string settings belonging to one client.
///
/// Sessions are shared (`Arc`) between the registry and every request
/// that resolved them, so the settings map carries its own lock.
#[derive(Debug)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    settings: Mutex<HashMap<String, String>>,
}

impl Session {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            settings: Mutex::new(HashMap::new()),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current value of `name`, or `""` when unset.
    pub fn get_setting(&self, name: &str) -> String {
        self.settings.lock().get(name).cloned().unwrap_or_default()
    }

    /// Store `value` under `name`, replacing any previous value.
    pub fn set_setting(&self, name: impl Into<String>, value: impl Into<String>) {
        self.settings.lock().insert(name.into(), value.into());
    }

    pub fn setting_count(&self) -> usize {
        self.settings.lock().len()
    }

    /// Setting names, sorted.
    pub fn setting_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.settings.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionHandle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A possibly-absent session as seen by a request.
///
/// Requests run without a session when no registry is configured or id
/// generation failed.  Every operation still works on an empty handle:
/// it reports a missing-receiver condition and yields the zero value.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Option<Arc<Session>>);

impl SessionHandle {
    pub fn new(session: Arc<Session>) -> Self {
        Self(Some(session))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn session(&self) -> Option<&Arc<Session>> {
        self.0.as_ref()
    }

    pub fn identifier(&self) -> &str {
        match &self.0 {
            Some(s) => s.identifier(),
            None => {
                Error::MissingReceiver("session").report();
                ""
            }
        }
    }

    pub fn get_setting(&self, name: &str) -> String {
        match &self.0 {
            Some(s) => s.get_setting(name),
            None => {
                Error::MissingReceiver("session").report();
                String::new()
            }
        }
    }

    pub fn set_setting(&self, name: impl Into<String>, value: impl Into<String>) {
        match &self.0 {
            Some(s) => s.set_setting(name, value),
            None => Error::MissingReceiver("session").report(),
        }
    }

    /// First `n` characters of the id; `""` without a session.
    ///
    /// Used for log lines, which must never carry the full id.  Does not
    /// report: logging a request without a session is not a fault.
    pub fn id_prefix(&self, n: usize) -> &str {
        let Some(s) = &self.0 else {
            return "";
        };
        let id = s.identifier();
        match id.char_indices().nth(n) {
            Some((end, _)) => &id[..end],
            None => id,
        }
    }
}

impl From<Arc<Session>> for SessionHandle {
    fn from(session: Arc<Session>) -> Self {
        Self::new(session)
    }
}
