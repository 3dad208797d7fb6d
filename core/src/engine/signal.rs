use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tally_types::{AcquisitionReason, ItemQuality};

use super::TrackerSource;
use crate::inventory::{InventoryChange, ItemChanges};

/// Everything the engine reacts to, from the scanner, the two craft
/// sources, the settings window and the frame clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventorySignal {
    // Inventory scanner
    InventoryChanged {
        #[serde(default)]
        changes: Vec<InventoryChange>,
        #[serde(default)]
        item_changes: Option<ItemChanges>,
    },

    // Legacy craft monitor
    CraftStarted {
        item_id: u32,
    },
    CraftFailed {
        item_id: u32,
    },
    CraftCompleted {
        item_id: u32,
        #[serde(default)]
        quality: ItemQuality,
        quantity: u32,
    },

    // Acquisition tracker
    ItemAcquired {
        item_id: u32,
        #[serde(default)]
        quality: ItemQuality,
        quantity_increase: i32,
        reason: AcquisitionReason,
    },

    // Settings & unlocks
    ConfigurationChanged,
    UnlocksChanged {
        unlocked: BTreeSet<u32>,
    },

    Tick {
        now: NaiveDateTime,
    },
}

impl InventorySignal {
    /// The craft source that produced this signal, if it came from one
    pub fn source(&self) -> Option<TrackerSource> {
        match self {
            InventorySignal::CraftStarted { .. }
            | InventorySignal::CraftFailed { .. }
            | InventorySignal::CraftCompleted { .. } => Some(TrackerSource::CraftMonitor),
            InventorySignal::ItemAcquired { .. } => Some(TrackerSource::AcquisitionTracker),
            _ => None,
        }
    }
}
