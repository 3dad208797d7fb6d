//! Scenario files
//!
//! A scenario is a TOML document describing the starting state (settings,
//! characters, cached inventories, lists) and a script of signals to feed
//! the reconciler, in order.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tally_core::inventory::{Character, InventoryItem};
use tally_core::{AppConfig, AcquisitionReason, CraftListMode, InventorySignal, ItemQuality};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse scenario {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("scenario list '{0}' has no requirements")]
    EmptyList(String),

    #[error("service unavailable: {0}")]
    Service(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub settings: AppConfig,
    /// Character logged in while the script runs (0 = nobody)
    pub active_character: u64,
    #[serde(rename = "character")]
    pub characters: Vec<Character>,
    #[serde(rename = "inventory")]
    pub inventory: Vec<InventoryItem>,
    #[serde(rename = "list")]
    pub lists: Vec<ListSpec>,
    #[serde(rename = "event")]
    pub events: Vec<InventorySignal>,
}

#[derive(Debug, Deserialize)]
pub struct ListSpec {
    pub name: String,
    #[serde(default)]
    pub mode: CraftListMode,
    #[serde(default)]
    pub ephemeral: bool,
    /// Make this the list tracking writes into. The last one wins.
    #[serde(default)]
    pub active: bool,
    /// Acquisition reasons this list ignores
    #[serde(default)]
    pub untracked: Vec<AcquisitionReason>,
    #[serde(default)]
    pub required: Vec<RequiredItem>,
}

#[derive(Debug, Deserialize)]
pub struct RequiredItem {
    pub item_id: u32,
    #[serde(default)]
    pub quality: ItemQuality,
    pub quantity: u32,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario: Scenario = toml::from_str(&text).map_err(|source| ScenarioError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(list) = scenario.lists.iter().find(|l| l.required.is_empty()) {
            return Err(ScenarioError::EmptyList(list.name.clone()));
        }
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
active_character = 1

[settings]
automatically_download_market_prices = true

[[character]]
id = 1
name = "Tester"
world_id = 73

[[inventory]]
item_id = 100
quantity = 2
owner_id = 1
category = "character_bags"

[[list]]
name = "Goal"
active = true
untracked = ["combat_drop"]
required = [{ item_id = 100, quantity = 5 }]

[[event]]
type = "item_acquired"
item_id = 100
quantity_increase = 3
reason = "gathering"

[[event]]
type = "tick"
now = "2024-01-01T10:00:00"
"#;

    #[test]
    fn test_parse_scenario() {
        let scenario: Scenario = toml::from_str(SCENARIO).unwrap();
        assert!(scenario.settings.automatically_download_market_prices);
        assert!(scenario.settings.auto_save);
        assert_eq!(scenario.characters[0].world_id, 73);
        assert_eq!(scenario.lists[0].untracked, vec![AcquisitionReason::CombatDrop]);
        assert_eq!(scenario.lists[0].required[0].quality, ItemQuality::Normal);
        assert_eq!(scenario.events.len(), 2);
        assert!(matches!(
            scenario.events[0],
            InventorySignal::ItemAcquired {
                quantity_increase: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_list_without_requirements_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "[[list]]\nname = \"Nothing\"\n").unwrap();
        assert!(matches!(
            Scenario::load(&path),
            Err(ScenarioError::EmptyList(name)) if name == "Nothing"
        ));
    }
}
