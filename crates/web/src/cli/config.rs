use zw_domain::config::{Config, ConfigSeverity};

/// Print any config issues.  Returns `true` when there are no errors.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    for issue in &issues {
        println!("{issue}");
    }
    println!(
        "\n{error_count} error(s), {} warning(s) in {config_path}",
        issues.len() - error_count,
    );

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
