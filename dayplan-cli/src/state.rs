use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn dayplan_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".dayplan"))
}

pub fn ensure_dayplan_home() -> Result<PathBuf> {
    let dir = dayplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(dayplan_home()?.join("config.toml"))
}
