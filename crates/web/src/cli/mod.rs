pub mod config;

use clap::{Parser, Subcommand};

/// zweb: cookie-session web server.
#[derive(Debug, Parser)]
#[command(name = "zweb", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `ZW_CONFIG` (or `config.toml`).
/// A missing file yields the defaults.  Returns the config and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(zw_domain::config::Config, String)> {
    let config_path = std::env::var("ZW_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(path: &str) -> anyhow::Result<zw_domain::config::Config> {
    if !std::path::Path::new(path).exists() {
        return Ok(zw_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = load_config_from("/nonexistent/zweb.toml").unwrap();
        assert_eq!(cfg.server.port, 3210);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let path = std::env::temp_dir().join(format!("zweb-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[server\nport = 1").unwrap();
        let err = load_config_from(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("parsing "));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["zweb", "config", "validate"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand::Validate))
        ));
        let cli = Cli::parse_from(["zweb"]);
        assert!(cli.command.is_none());
    }
}
