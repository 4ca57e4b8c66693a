use crate::conf::{TallydConfig, load_config};
use std::path::PathBuf;

/// Print the configuration with every default filled in, as TOML or JSON.
pub fn dump(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let cfg = load_config(&path)?;
    let rendered = render(&cfg.source, json)?;
    println!("{rendered}");
    Ok(())
}

fn render(config: &TallydConfig, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(config)?)
    } else {
        Ok(toml::to_string_pretty(config)?)
    }
}
