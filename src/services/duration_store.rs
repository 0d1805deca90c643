//! Persisted timer duration setting

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use anyhow::Context;
use tracing::{debug, info};

/// Key under which the countdown length is stored
pub const TIMER_VALUE_KEY: &str = "timer_value";

/// Duration used when nothing has been stored yet
pub const DEFAULT_TIMER_VALUE: i64 = 10;

/// Key-value store for integer settings
pub trait DurationStore {
    /// Read `key`, falling back to `default` when it has never been set
    fn get(&self, key: &str, default: i64) -> i64;

    /// Write `key`
    fn set(&mut self, key: &str, value: i64) -> anyhow::Result<()>;

    /// Current countdown length
    fn timer_value(&self) -> i64 {
        self.get(TIMER_VALUE_KEY, DEFAULT_TIMER_VALUE)
    }
}

/// In-memory store, nothing survives the process
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a timer value
    pub fn with_timer_value(value: i64) -> Self {
        let mut values = BTreeMap::new();
        values.insert(TIMER_VALUE_KEY.to_string(), value);
        Self { values }
    }
}

impl DurationStore for MemoryStore {
    fn get(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: i64) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a JSON object file (`{"timer_value": 10}`)
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonFileStore {
    /// Load the settings file. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Settings file {} is not a valid JSON object of integers", path.display()))?
        } else {
            debug!("Settings file {} not found, using defaults", path.display());
            BTreeMap::new()
        };

        info!("Loaded settings from {}", path.display());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create settings directory {}", parent.display()))?;
            }
        }

        let body = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .with_context(|| format!("Failed to write settings file {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace settings file {}", self.path.display()))?;
        Ok(())
    }
}

impl DurationStore for JsonFileStore {
    fn get(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: i64) -> anyhow::Result<()> {
        let previous = self.values.insert(key.to_string(), value);
        if let Err(e) = self.persist() {
            // keep memory and disk in agreement
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(e);
        }

        info!("Stored {}={} in {}", key, value, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.timer_value(), DEFAULT_TIMER_VALUE);
        assert_eq!(store.get("other", 3), 3);
    }

    #[test]
    fn value_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set(TIMER_VALUE_KEY, 42).unwrap();
        assert_eq!(store.timer_value(), 42);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.timer_value(), 42);
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        assert!(JsonFileStore::open(&path).is_err());
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        let mut store = JsonFileStore::open(sub.join("settings.json")).unwrap();
        store.set(TIMER_VALUE_KEY, 42).unwrap();

        // a regular file where the settings directory should be
        fs::remove_dir_all(&sub).unwrap();
        fs::write(&sub, "").unwrap();

        assert!(store.set(TIMER_VALUE_KEY, 7).is_err());
        assert_eq!(store.timer_value(), 42);

        assert!(store.set("other", 1).is_err());
        assert_eq!(store.get("other", 3), 3);
    }

    #[test]
    fn memory_store_defaults_and_overrides() {
        let mut store = MemoryStore::new();
        assert_eq!(store.timer_value(), 10);
        store.set(TIMER_VALUE_KEY, 5).unwrap();
        assert_eq!(store.timer_value(), 5);
        assert_eq!(MemoryStore::with_timer_value(0).timer_value(), 0);
    }
}
