use std::sync::Arc;

use zw_domain::config::Config;

use crate::runtime::WebRuntime;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Sessions, sequence numbers and diagnostics.
    pub runtime: Arc<WebRuntime>,
    /// SHA-256 hash of the admin bearer token (read once at startup).
    /// `None` = dev mode (admin endpoints accessible without auth).
    pub admin_token_hash: Option<Vec<u8>>,
}

impl AppState {
    pub fn new(config: Arc<Config>, runtime: Arc<WebRuntime>) -> Self {
        Self {
            config,
            runtime,
            admin_token_hash: None,
        }
    }
}
