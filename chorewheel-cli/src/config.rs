use anyhow::{Context, Result};
use chorewheel_core::{DueClock, Platform, DEFAULT_CLOCK_FORMAT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_chorewheel_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSection,
    pub reminders: RemindersSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    /// Bearer token for the chore API. Leave unset to plan from snapshot files only.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemindersSection {
    /// IANA zone used when printing due times, e.g. "America/Chicago".
    pub timezone: String,
    pub clock_format: String,
    /// Force "native" or "web" instead of probing for a desktop notifier.
    pub platform: Option<String>,
    pub max_deliver_per_run: usize,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2021".to_string(),
            token: None,
        }
    }
}

impl Default for RemindersSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            clock_format: DEFAULT_CLOCK_FORMAT.to_string(),
            platform: None,
            max_deliver_per_run: 10,
        }
    }
}

impl Config {
    pub fn clock(&self) -> Result<DueClock> {
        DueClock::new(&self.reminders.timezone, &self.reminders.clock_format)
            .context("config.toml [reminders]")
    }

    pub fn platform_override(&self) -> Result<Option<Platform>> {
        self.reminders
            .platform
            .as_deref()
            .map(|p| p.parse::<Platform>().map_err(anyhow::Error::msg))
            .transpose()
            .context("config.toml [reminders].platform")
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_chorewheel_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn config_check() -> Result<()> {
    let cfg = load_config()?;

    println!("Config ({}):\n", config_path()?.display());
    println!("- api.base_url: {}", cfg.api.base_url);
    println!(
        "- api.token: {}",
        if cfg.api.token.is_some() { "<set>" } else { "<not set>" }
    );
    println!("- reminders.timezone: {}", cfg.reminders.timezone);
    println!("- reminders.clock_format: {}", cfg.reminders.clock_format);
    println!(
        "- reminders.platform: {}",
        cfg.reminders.platform.as_deref().unwrap_or("<auto>")
    );
    println!("- reminders.max_deliver_per_run: {}", cfg.reminders.max_deliver_per_run);

    if let Err(e) = cfg.clock() {
        println!("\nWarning: {e:#}");
    }
    if let Err(e) = cfg.platform_override() {
        println!("\nWarning: {e:#}");
    }

    if cfg.api.token.is_none() {
        println!("\nTo plan straight from the chore API, set in config.toml:");
        println!("[api]");
        println!("base_url = \"https://chores.example.com\"");
        println!("token = \"<api token>\"");
    }

    Ok(())
}
