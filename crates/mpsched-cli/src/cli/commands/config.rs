//! `mpsched config` – show where the config lives and what it resolves to.

use anyhow::{Context, Result};
use mpsched_core::config;

pub fn run_config() -> Result<()> {
    let path = config::config_path()?;
    let cfg = config::load_or_init()?;
    let text = toml::to_string_pretty(&cfg).context("serialize config")?;
    println!("# {}", path.display());
    print!("{}", text);
    Ok(())
}
