//! Inventory data delivered by the scanner

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tally_types::{InventoryCategory, ItemQuality};

/// An item stack sitting in one inventory slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: u32,
    pub quantity: u32,
    #[serde(default)]
    pub quality: ItemQuality,
    /// Character, retainer, free company or house the inventory belongs to
    pub owner_id: u64,
    pub category: InventoryCategory,
    #[serde(default)]
    pub slot: u16,
}

/// Difference in one slot between two scans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryChange {
    pub owner_id: u64,
    pub category: InventoryCategory,
    #[serde(default)]
    pub slot: u16,
    pub item_id: u32,
    #[serde(default)]
    pub quality: ItemQuality,
    #[serde(default)]
    pub from_quantity: u32,
    #[serde(default)]
    pub to_quantity: u32,
}

/// An item that showed up (or disappeared) between two scans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemChangesItem {
    pub item_id: u32,
    pub quantity: u32,
    pub date: NaiveDateTime,
}

/// Summary of items that were newly seen or fully removed in a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemChanges {
    pub new_items: Vec<ItemChangesItem>,
    pub removed_items: Vec<ItemChangesItem>,
}

/// A logged-in character known to the character registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub world_id: u32,
}
