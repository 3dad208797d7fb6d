//! Filter configurations ("lists")
//!
//! A [`FilterConfiguration`] is what a user calls a list: its name and type,
//! where items are searched and sorted to, its display columns, the craft
//! list state for craft-type lists, and the raw values of its filter rules.
//! Rules themselves live in [`rules`] and read/write those values.

mod columns_rule;
pub mod rules;

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tally_types::{CraftListMode, FilterItemsRetainer, FilterType, InventoryCategory};

use crate::columns::{ColumnConfiguration, ColumnRegistry};
use crate::crafting::CraftList;

pub use columns_rule::{ColumnDetails, ColumnsFilter, ColumnsValue};
pub use rules::{BooleanRule, FilterRule, StringRule, TrackingToggles};

/// A specific inventory of a specific owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryRef {
    pub owner_id: u64,
    pub category: InventoryCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfiguration {
    /// Unique identifier for this list
    pub key: String,
    pub name: String,
    pub filter_type: FilterType,
    pub display_in_tabs: bool,

    // ─── Sources & Destinations ─────────────────────────────────────────────
    pub source_all_characters: bool,
    pub source_all_retainers: bool,
    pub source_all_free_companies: bool,
    pub source_all_houses: bool,
    pub source_inventories: Vec<InventoryRef>,
    pub destination_inventories: Vec<InventoryRef>,
    pub source_categories: BTreeSet<InventoryCategory>,
    pub destination_categories: BTreeSet<InventoryCategory>,
    pub filter_items_in_retainers: FilterItemsRetainer,

    // ─── Display ────────────────────────────────────────────────────────────
    pub duplicates_only: bool,
    pub highlight_when: Option<String>,
    pub columns: Vec<ColumnConfiguration>,

    // ─── Crafting ───────────────────────────────────────────────────────────
    /// Only meaningful when `filter_type` is `CraftFilter`
    pub craft_list: CraftList,
    /// Removed automatically once its craft list completes
    pub is_ephemeral_craft_list: bool,

    // ─── Rule values ────────────────────────────────────────────────────────
    pub boolean_filters: HashMap<String, bool>,
    pub string_filters: HashMap<String, String>,

    /// Set when displayed rows must be recomputed
    #[serde(skip)]
    pub needs_refresh: bool,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self {
            key: uuid::Uuid::new_v4().to_string(),
            name: String::new(),
            filter_type: FilterType::default(),
            display_in_tabs: false,
            source_all_characters: false,
            source_all_retainers: false,
            source_all_free_companies: false,
            source_all_houses: false,
            source_inventories: Vec::new(),
            destination_inventories: Vec::new(),
            source_categories: BTreeSet::new(),
            destination_categories: BTreeSet::new(),
            filter_items_in_retainers: FilterItemsRetainer::default(),
            duplicates_only: false,
            highlight_when: None,
            columns: Vec::new(),
            craft_list: CraftList::default(),
            is_ephemeral_craft_list: false,
            boolean_filters: HashMap::new(),
            string_filters: HashMap::new(),
            needs_refresh: false,
        }
    }
}

impl FilterConfiguration {
    pub fn new(name: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            name: name.into(),
            filter_type,
            ..Self::default()
        }
    }

    pub fn new_craft_list(name: impl Into<String>, mode: CraftListMode) -> Self {
        Self {
            craft_list: CraftList::new(mode),
            ..Self::new(name, FilterType::CraftFilter)
        }
    }

    pub fn is_craft_list(&self) -> bool {
        self.filter_type == FilterType::CraftFilter
    }

    /// The craft list, but only when this is a craft-type list
    pub fn active_craft_list(&self) -> Option<&CraftList> {
        self.is_craft_list().then_some(&self.craft_list)
    }

    pub fn active_craft_list_mut(&mut self) -> Option<&mut CraftList> {
        if self.is_craft_list() {
            Some(&mut self.craft_list)
        } else {
            None
        }
    }

    /// First column configuration with the given key
    pub fn get_column(&self, key: &str) -> Option<&ColumnConfiguration> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Attach column behaviors after loading. Returns the keys that could not
    /// be resolved; those configurations stay in place, unbound.
    pub fn bind_columns(&mut self, registry: &ColumnRegistry) -> Vec<String> {
        self.columns
            .iter_mut()
            .filter_map(|config| (!registry.bind(config)).then(|| config.key.clone()))
            .collect()
    }

    /// Whether any explicit or "all" source has been chosen
    pub fn has_sources(&self) -> bool {
        self.source_all_characters
            || self.source_all_retainers
            || self.source_all_free_companies
            || self.source_all_houses
            || !self.source_inventories.is_empty()
            || !self.source_categories.is_empty()
    }
}
