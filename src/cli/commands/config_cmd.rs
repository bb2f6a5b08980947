//! Configuration display command.

use console::style;

use crate::cli::icons;
use crate::config::Config;

/// Print the effective configuration as TOML.
pub async fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    match &config.source_path {
        Some(path) => eprintln!(
            "{} Loaded from {}",
            icons::dim_arrow(),
            style(path.display()).cyan()
        ),
        None => eprintln!("{} No config file found, using defaults", icons::dim_arrow()),
    }
    print!("{}", config.redacted().to_toml()?);
    Ok(())
}
