//! Show or persist the effective configuration.

use trackcut_common::AppConfig;

pub fn run(config: &AppConfig, save: bool) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to save config: {e}"))?;
        println!("Configuration saved.");
    }
    Ok(())
}
