use anyhow::{bail, Result};
use tracing::info;

use bulletlane_core::AppConfig;

pub fn run(config: &AppConfig, path: bool, init: bool) -> Result<()> {
    let config_path = AppConfig::config_path();

    if path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            bail!("Config file already exists: {}", config_path.display());
        }
        AppConfig::default().save()?;
        info!("Wrote default config to {}", config_path.display());
        println!("Created {}", config_path.display());
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
