//! Configuration management commands.

use console::style;

use foodlabel::config::Config;

/// Print the effective configuration.
pub fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    let source = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults (no config file found)".to_string());

    println!("{} Config source: {}", style("→").cyan(), source);
    println!();
    print!("{}", config.to_toml_redacted()?);

    if let Err(e) = config.validate(true) {
        println!();
        println!("{} {}", style("!").yellow(), e);
    }

    Ok(())
}
