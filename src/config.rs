use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::epg::GuideWindow;
use crate::errors::{GuideError, Result};

pub const SETTINGS_KEY: &str = "settings";
pub const HISTORY_KEY: &str = "watchHistory";
pub const LAST_CHANNEL_KEY: &str = "lastWatchedChannelId";

/// Realistic range of the hour offset
pub const MIN_OFFSET_HOURS: i32 = -12;
pub const MAX_OFFSET_HOURS: i32 = 14;

/// Key-value blob store for settings and history
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn clear(&self, key: &str) -> Result<()>;
}

/// One JSON file per key under the platform config directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the user's config directory, if the platform has one
    pub fn in_config_dir() -> Option<Self> {
        let proj = ProjectDirs::from("tv", "fibre", "fibre-tv")?;
        Some(Self::new(proj.config_dir()))
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for tests and sessions that shouldn't persist
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|e| GuideError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|e| GuideError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|e| GuideError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct VisibleTabs {
    pub live: bool,
    pub recordings: bool,
    pub movies: bool,
    pub series: bool,
    pub youtube: bool,
    pub music: bool,
}

impl Default for VisibleTabs {
    fn default() -> Self {
        Self {
            live: true,
            recordings: true,
            movies: true,
            series: true,
            youtube: true,
            music: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuideSettings {
    pub hours_before: u32,
    pub hours_after: u32,
    /// Delay before guide ingestion starts, letting the first paint settle
    pub settle_delay_ms: u64,
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self {
            hours_before: GuideWindow::DEFAULT_HOURS_BEFORE,
            hours_after: GuideWindow::DEFAULT_HOURS_AFTER,
            settle_delay_ms: 500,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub xc_url: String,
    #[serde(default)]
    pub xc_user: String,
    #[serde(default)]
    pub xc_pass: String,
    /// Hours added to every displayed time and "now" comparison
    #[serde(default)]
    pub time_zone: i32,
    #[serde(default)]
    pub visible_tabs: VisibleTabs,
    #[serde(default)]
    pub guide: GuideSettings,
}

impl AppConfig {
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let Some(json) = store.get(SETTINGS_KEY)? else {
            debug!("no stored settings, using defaults");
            return Ok(AppConfig::default());
        };
        let mut config: AppConfig = serde_json::from_str(&json)?;
        config.time_zone = clamp_offset(config.time_zone);
        Ok(config)
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        store.set(SETTINGS_KEY, &content)
    }

    pub fn has_credentials(&self) -> bool {
        !self.xc_url.trim().is_empty()
    }

    pub fn set_time_zone(&mut self, offset_hours: i32) {
        self.time_zone = clamp_offset(offset_hours);
    }

    pub fn guide_window(&self, now_adjusted: i64) -> GuideWindow {
        GuideWindow::around(now_adjusted, self.guide.hours_before, self.guide.hours_after)
    }
}

pub fn clamp_offset(offset_hours: i32) -> i32 {
    offset_hours.clamp(MIN_OFFSET_HOURS, MAX_OFFSET_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let store = MemoryStore::new();
        let config = AppConfig::load(&store).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.visible_tabs.live);
        assert_eq!(config.guide.hours_before, 4);
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_roundtrip_and_clamp() {
        let store = MemoryStore::new();
        let mut config = AppConfig {
            xc_url: "http://tv".into(),
            xc_user: "u".into(),
            xc_pass: "p".into(),
            ..Default::default()
        };
        config.set_time_zone(20);
        assert_eq!(config.time_zone, 14);
        config.save(&store).unwrap();

        let loaded = AppConfig::load(&store).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.has_credentials());
    }

    #[test]
    fn test_partial_settings_blob() {
        let store = MemoryStore::new();
        store.set(SETTINGS_KEY, r#"{"xcUrl":"http://tv","timeZone":-30}"#).unwrap();
        let config = AppConfig::load(&store).unwrap();
        assert_eq!(config.time_zone, -12);
        assert_eq!(config.visible_tabs, VisibleTabs::default());
    }

    #[test]
    fn test_corrupt_settings_is_config_error() {
        let store = MemoryStore::new();
        store.set(SETTINGS_KEY, "{not json").unwrap();
        assert!(matches!(AppConfig::load(&store), Err(GuideError::Config(_))));
    }

    #[test]
    fn test_memory_store_clear() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.clear("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_config_dir_store() {
        // Platforms without a home directory have no config dir
        if let Some(store) = FileStore::in_config_dir() {
            assert!(store.dir.to_string_lossy().contains("fibre-tv"));
            assert!(store.path(SETTINGS_KEY).ends_with("settings.json"));
        }
    }

    #[test]
    fn test_file_store() {
        let dir = std::env::temp_dir().join(format!("fibre-tv-store-{}", std::process::id()));
        let store = FileStore::new(&dir);
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("k", "{\"a\":1}").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("{\"a\":1}"));
        store.clear("k").unwrap();
        store.clear("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        let _ = fs::remove_dir_all(dir);
    }
}
