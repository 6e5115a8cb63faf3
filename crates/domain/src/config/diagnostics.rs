use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Diagnostics (request/reply capture)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Paired request/reply capture.  Never enable this in production: it
/// writes post bodies and session id prefixes to the sink and serializes
/// every request through one lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Print full bodies instead of escaped previews.
    #[serde(default)]
    pub verbose: bool,

    /// Reply preview length in non-verbose mode.
    #[serde(default = "d_preview_chars")]
    pub preview_chars: usize,

    #[serde(default)]
    pub sink: DiagnosticSinkKind,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            verbose: false,
            preview_chars: d_preview_chars(),
            sink: DiagnosticSinkKind::default(),
        }
    }
}

/// Where diagnostic records are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSinkKind {
    #[default]
    Stdout,
    /// Forward records to `tracing` at debug level.
    Tracing,
}

fn d_preview_chars() -> usize {
    40
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default() {
        let cfg: DiagnosticsConfig = toml::from_str("").unwrap();
        assert!(!cfg.enabled);
        assert!(!cfg.verbose);
        assert_eq!(cfg.preview_chars, 40);
        assert_eq!(cfg.sink, DiagnosticSinkKind::Stdout);
    }

    #[test]
    fn parses_tracing_sink() {
        let cfg: DiagnosticsConfig = toml::from_str(
            r#"
            enabled = true
            sink = "tracing"
            "#,
        )
        .unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.sink, DiagnosticSinkKind::Tracing);
    }
}
