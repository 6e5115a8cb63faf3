//! In-memory session registry.
//!
//! One exclusive lock covers lookup-or-insert so a given id maps to at most
//! one [`Session`] for the life of the registry.  Sessions are never
//! evicted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use zw_domain::error::{Error, Result};
use zw_domain::trace::TraceEvent;

use crate::session::{Session, SessionHandle};

/// Attempts at minting an unused id before giving up on the request.
const MAX_ID_ATTEMPTS: usize = 3;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Id generation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Source of fresh session ids.
pub trait IdSource: Send + Sync {
    fn generate(&self) -> Result<String>;
}

/// Random UUID v4 rendered as 32 lowercase hex digits, no dashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn generate(&self) -> Result<String> {
        Ok(uuid::Uuid::new_v4().simple().to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Outcome of resolving a request's cookie against the registry.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub session: SessionHandle,
    /// Id the client must be told to store, when a session was created.
    pub issued_cookie: Option<String>,
}

impl Resolution {
    /// No session attached; nothing to send back.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_new(&self) -> bool {
        self.issued_cookie.is_some()
    }
}

/// Admin view of one session.  Only the id prefix is exposed.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id_prefix: String,
    pub created_at: DateTime<Utc>,
    pub settings: usize,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
    ids: Box<dyn IdSource>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_id_source(UuidIdSource)
    }

    pub fn with_id_source(ids: impl IdSource + 'static) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ids: Box::new(ids),
        }
    }

    /// Get-or-create the session for an inbound cookie value.
    ///
    /// A known id returns its session and issues nothing.  An absent or
    /// unknown id mints a new session and returns its id as the cookie to
    /// set.  If no id can be minted the request proceeds without a session.
    pub fn resolve(&self, cookie_value: Option<&str>) -> Resolution {
        let mut sessions = self.sessions.lock();

        if let Some(id) = cookie_value.filter(|v| !v.is_empty()) {
            if let Some(existing) = sessions.get(id) {
                return Resolution {
                    session: SessionHandle::new(existing.clone()),
                    issued_cookie: None,
                };
            }
        }

        let id = match self.mint_id(&sessions) {
            Ok(id) => id,
            Err(e) => {
                drop(sessions);
                e.report();
                return Resolution::none();
            }
        };

        let session = Arc::new(Session::new(id.clone()));
        sessions.insert(id.clone(), session.clone());
        let count = sessions.len();
        drop(sessions);

        TraceEvent::SessionCreated {
            session_prefix: id.chars().take(8).collect(),
            sessions: count,
        }
        .emit();

        Resolution {
            session: SessionHandle::new(session),
            issued_cookie: Some(id),
        }
    }

    /// [`resolve`](Self::resolve) for callers whose registry is optional.
    ///
    /// Without a registry this reports the condition and returns an empty
    /// resolution.
    pub fn resolve_optional(registry: Option<&Self>, cookie_value: Option<&str>) -> Resolution {
        match registry {
            Some(r) => r.resolve(cookie_value),
            None => {
                Error::MissingReceiver("session registry").report();
                Resolution::none()
            }
        }
    }

    fn mint_id(&self, sessions: &HashMap<String, Arc<Session>>) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.generate()?;
            if id.is_empty() {
                return Err(Error::IdGeneration("id source produced an empty id".into()));
            }
            if !sessions.contains_key(&id) {
                return Ok(id);
            }
            tracing::warn!("generated session id collided with a live session");
        }
        Err(Error::IdGeneration(format!(
            "no unused id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Summaries of all sessions, oldest first.
    pub fn snapshot(&self) -> Vec<SessionSummary> {
        // Clone out first; session locks are taken without the registry lock.
        let sessions: Vec<Arc<Session>> = self.sessions.lock().values().cloned().collect();
        let mut out: Vec<SessionSummary> = sessions
            .iter()
            .map(|s| SessionSummary {
                id_prefix: s.identifier().chars().take(8).collect(),
                created_at: s.created_at(),
                settings: s.setting_count(),
            })
            .collect();
        out.sort_by_key(|s| s.created_at);
        out
    }
}
