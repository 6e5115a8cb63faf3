//! AppState construction extracted from `main.rs`.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};

use zw_domain::config::{Config, ConfigSeverity};

use crate::runtime::{self, WebRuntime};
use crate::state::AppState;

/// Validate config, build the process runtime and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Runtime ──────────────────────────────────────────────────────
    let runtime = runtime::install_global(Arc::new(WebRuntime::from_config(&config)))
        .context("installing web runtime")?;
    tracing::info!(
        sessions = config.sessions.enabled,
        cookie = %config.sessions.cookie_name,
        diagnostics = config.diagnostics.enabled,
        "web runtime ready"
    );

    // ── Admin token ──────────────────────────────────────────────────
    let admin_token_hash = read_token_hash(&config.admin.token_env);
    if admin_token_hash.is_none() {
        tracing::warn!(
            env = %config.admin.token_env,
            "admin token not set; /v1/sessions is open (dev mode)"
        );
    }

    Ok(AppState {
        admin_token_hash,
        ..AppState::new(config, runtime)
    })
}

/// SHA-256 of the token in `env_var`, or `None` when unset or empty.
pub fn read_token_hash(env_var: &str) -> Option<Vec<u8>> {
    std::env::var(env_var)
        .ok()
        .filter(|t| !t.is_empty())
        .map(|t| Sha256::digest(t.as_bytes()).to_vec())
}
