use anyhow::{Context, Result};
use chorewheel_core::DevicePreferences;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key the host app stores the device notification blob under.
pub const DEVICE_PREFS_KEY: &str = "notificationPreferences";

pub fn chorewheel_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CHOREWHEEL_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".chorewheel"))
}

pub fn ensure_chorewheel_home() -> Result<PathBuf> {
    let dir = chorewheel_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn preferences_path() -> Result<PathBuf> {
    Ok(ensure_chorewheel_home()?.join("preferences.json"))
}

/// Flat string key-value store persisted as one JSON object.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(preferences_path()?))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        if s.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    /// Where an unreadable store is moved before it gets overwritten.
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut all = match self.read_all() {
            Ok(all) => all,
            Err(e) => {
                let bak = self.backup_path();
                tracing::warn!(
                    "overwriting unreadable preference store ({:#}); old contents kept in {}",
                    e,
                    bak.display()
                );
                fs::copy(&self.path, &bak).with_context(|| format!("back up {}", self.path.display()))?;
                BTreeMap::new()
            }
        };
        all.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&all)?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    /// Resolve device notification preferences, failing closed on any read problem.
    pub fn device_prefs(&self) -> DevicePreferences {
        match self.get(DEVICE_PREFS_KEY) {
            Ok(blob) => DevicePreferences::from_blob(blob.as_deref()),
            Err(e) => {
                tracing::warn!("device preferences unavailable: {:#}", e);
                DevicePreferences::disabled()
            }
        }
    }

    pub fn save_device_prefs(&self, prefs: &DevicePreferences) -> Result<()> {
        self.set(DEVICE_PREFS_KEY, &prefs.to_blob())
    }
}
