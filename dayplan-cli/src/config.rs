use anyhow::{Context, Result};
use dayplan_core::time::parse_timezone;
use dayplan_core::{Category, CategoryMap, DayTemplate, ScheduleError, ScheduleOptions, WritebackPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{default_config_path, ensure_dayplan_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub day: DaySection,
    pub scheduler: ScheduleOptions,
    pub focus: FocusSection,
    pub categories: CategoriesSection,
    pub writeback: WritebackPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaySection {
    /// IANA name, e.g. "America/Chicago".
    pub timezone: String,
    #[serde(flatten)]
    pub template: DayTemplate,
}

impl Default for DaySection {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            template: DayTemplate::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusSection {
    /// How many tasks the Today slate should hold.
    pub target: usize,
}

impl Default for FocusSection {
    fn default() -> Self {
        Self { target: 3 }
    }
}

/// Extra project names per category, on top of the built-in mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesSection {
    pub work: Vec<String>,
    pub personal: Vec<String>,
    pub project: Vec<String>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        parse_timezone(&self.day.timezone)?;
        self.day.template.validate()?;
        self.scheduler.validate()?;
        if self.focus.target == 0 {
            return Err(ScheduleError::option("focus.target", "must be at least 1"));
        }
        Ok(())
    }

    pub fn category_map(&self) -> CategoryMap {
        let mut map = CategoryMap::default();
        for (names, category) in [
            (&self.categories.work, Category::Work),
            (&self.categories.personal, Category::Personal),
            (&self.categories.project, Category::Project),
        ] {
            for name in names {
                map.insert(name, category);
            }
        }
        map
    }
}

pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

/// Missing file means defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = resolve_path(explicit)?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", p.display()))?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => ensure_dayplan_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
