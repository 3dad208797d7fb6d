//! Application settings
//!
//! Persisted through confy as TOML. Every field has a default so older
//! config files keep loading after new settings are added.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tally_types::InventoryChangeReason;

use crate::error::ConfigError;

/// Name used for the config directory and file
pub const APP_NAME: &str = "tally";

pub const DEFAULT_AUTO_SAVE_MINUTES: u32 = 10;

/// Items a character has unlocked, as last reported by the unlock tracker
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterUnlocks {
    pub character_id: u64,
    pub items: BTreeSet<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Drive craft lists from the legacy craft monitor instead of the
    /// acquisition tracker. Exactly one of the two sources is honoured.
    pub use_old_craft_tracker: bool,

    // ─── Auto Save ───────────────────────────────────────────────────────────
    pub auto_save: bool,
    /// Minutes between automatic saves (0 = never arm the timer)
    pub auto_save_minutes: u32,

    // ─── Market ──────────────────────────────────────────────────────────────
    /// Request a price check for every item whose slot changed
    pub automatically_download_market_prices: bool,

    // ─── Trackers ────────────────────────────────────────────────────────────
    pub track_mob_spawns: bool,
    pub history_enabled: bool,
    /// Change reasons the history should record (None = leave as is)
    pub history_track_reasons: Option<Vec<InventoryChangeReason>>,

    pub first_run: bool,
    pub acquired_items: Vec<CharacterUnlocks>,

    /// Set when something wants the configuration written on the next flush
    #[serde(skip)]
    pub is_dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_old_craft_tracker: false,
            auto_save: true,
            auto_save_minutes: DEFAULT_AUTO_SAVE_MINUTES,
            automatically_download_market_prices: false,
            track_mob_spawns: false,
            history_enabled: false,
            history_track_reasons: None,
            first_run: true,
            acquired_items: Vec::new(),
            is_dirty: false,
        }
    }
}

impl AppConfig {
    /// Load from the platform config directory, falling back to defaults
    pub fn load() -> Self {
        match confy::load::<AppConfig>(APP_NAME, None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        confy::load_path(path).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Store to the platform config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self).map_err(|source| ConfigError::Store {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, None).map_err(|_| ConfigError::NoConfigDir)
    }

    /// Auto save interval, or None when the timer should never be armed
    pub fn auto_save_interval(&self) -> Option<chrono::Duration> {
        (self.auto_save_minutes != 0)
            .then(|| chrono::Duration::minutes(i64::from(self.auto_save_minutes)))
    }

    pub fn acquired_items(&self, character_id: u64) -> Option<&BTreeSet<u32>> {
        self.acquired_items
            .iter()
            .find(|entry| entry.character_id == character_id)
            .map(|entry| &entry.items)
    }

    /// Replace the unlocked item set stored for a character
    pub fn set_acquired_items(&mut self, character_id: u64, items: BTreeSet<u32>) {
        match self
            .acquired_items
            .iter_mut()
            .find(|entry| entry.character_id == character_id)
        {
            Some(entry) => entry.items = items,
            None => self.acquired_items.push(CharacterUnlocks {
                character_id,
                items,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = toml::from_str("use_old_craft_tracker = true\n").unwrap();
        assert!(config.use_old_craft_tracker);
        assert!(config.auto_save);
        assert_eq!(config.auto_save_minutes, DEFAULT_AUTO_SAVE_MINUTES);
        assert!(config.first_run);
        assert!(!config.is_dirty);
    }

    #[test]
    fn test_zero_interval_disables_timer() {
        let config = AppConfig {
            auto_save_minutes: 0,
            ..AppConfig::default()
        };
        assert!(config.auto_save_interval().is_none());
        assert_eq!(
            AppConfig::default().auto_save_interval(),
            Some(chrono::Duration::minutes(10))
        );
    }

    #[test]
    fn test_acquired_items_replace() {
        let mut config = AppConfig::default();
        config.set_acquired_items(7, BTreeSet::from([1, 2]));
        config.set_acquired_items(7, BTreeSet::from([3]));
        assert_eq!(config.acquired_items.len(), 1);
        assert_eq!(config.acquired_items(7), Some(&BTreeSet::from([3])));
        assert!(config.acquired_items(8).is_none());
    }

    #[test]
    fn test_store_and_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = AppConfig {
            auto_save_minutes: 3,
            first_run: false,
            is_dirty: true,
            ..AppConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.auto_save_minutes, 3);
        assert!(!loaded.first_run);
        assert!(!loaded.is_dirty);
    }
}
