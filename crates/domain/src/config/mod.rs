mod diagnostics;
mod observability;
mod server;
mod sessions;

pub use diagnostics::*;
pub use observability::*;
pub use server::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Admin
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Environment variable holding the admin bearer token.
    /// If the env var is unset, admin endpoints are open (dev mode).
    #[serde(default = "d_admin_token_env")]
    pub token_env: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            token_env: d_admin_token_env(),
        }
    }
}

fn d_admin_token_env() -> String {
    "ZW_ADMIN_TOKEN".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.server.max_concurrent_requests == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.max_concurrent_requests".into(),
                message: "must be greater than 0".into(),
            });
        }

        // Cookie names are RFC 6265 tokens.
        let name = &self.sessions.cookie_name;
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "sessions.cookie_name".into(),
                message: format!("{name:?} is not a valid cookie name"),
            });
        }

        if !self.sessions.cookie_path.starts_with('/') {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "sessions.cookie_path".into(),
                message: "cookie path must start with '/'".into(),
            });
        }

        if self.diagnostics.enabled {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "diagnostics.enabled".into(),
                message: "request/reply payloads and session ids are logged; \
                          every request is serialized through one lock"
                    .into(),
            });
            if self.diagnostics.preview_chars == 0 {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: "diagnostics.preview_chars".into(),
                    message: "0 hides every reply preview".into(),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "observability.sample_rate".into(),
                message: "sample_rate must be within 0.0..=1.0".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn bad_cookie_name_is_an_error() {
        let mut cfg = Config::default();
        cfg.sessions.cookie_name = "app session".into();
        let issues = cfg.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Error);
        assert_eq!(issues[0].field, "sessions.cookie_name");
    }

    #[test]
    fn diagnostics_enabled_warns() {
        let mut cfg = Config::default();
        cfg.diagnostics.enabled = true;
        let issues = cfg.validate();
        assert!(issues
            .iter()
            .all(|i| i.severity == ConfigSeverity::Warning));
        assert!(issues.iter().any(|i| i.field == "diagnostics.enabled"));
    }

    #[test]
    fn display_tags_severity() {
        let issue = ConfigError {
            severity: ConfigSeverity::Warning,
            field: "x".into(),
            message: "y".into(),
        };
        assert_eq!(issue.to_string(), "[WARN] x: y");
    }
}
