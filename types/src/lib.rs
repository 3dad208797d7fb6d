//! Shared types for Tally
//!
//! Plain data used by the core engine, the replay tool and anything that
//! persists or displays lists. Nothing in here carries behavior beyond
//! small helpers and display impls.

pub mod formatting;

use std::fmt;

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// List Types
// ═══════════════════════════════════════════════════════════════════════════

/// What kind of list a filter configuration is. Chosen at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Search the characters' inventories
    #[default]
    SearchFilter,
    /// Search and suggest where items should be moved
    SortingFilter,
    /// Search every item in the game
    GameItemFilter,
    /// Track progress towards a set of items to craft or acquire
    CraftFilter,
    /// Inventory history
    HistoryFilter,
    /// A hand-picked list of items
    CuratedList,
}

impl FilterType {
    pub const ALL: [FilterType; 6] = [
        Self::SearchFilter,
        Self::SortingFilter,
        Self::GameItemFilter,
        Self::CraftFilter,
        Self::HistoryFilter,
        Self::CuratedList,
    ];

    /// Bit used when a set of filter types is packed into a [`FilterTypes`] mask
    pub const fn bit(self) -> u8 {
        match self {
            Self::SearchFilter => 1,
            Self::SortingFilter => 1 << 1,
            Self::GameItemFilter => 1 << 2,
            Self::CraftFilter => 1 << 3,
            Self::HistoryFilter => 1 << 4,
            Self::CuratedList => 1 << 5,
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SearchFilter => "Search List",
            Self::SortingFilter => "Sort List",
            Self::GameItemFilter => "Game Item List",
            Self::CraftFilter => "Craft List",
            Self::HistoryFilter => "History List",
            Self::CuratedList => "Curated List",
        };
        f.write_str(label)
    }
}

/// A set of filter types, used for "available in" and "default in" capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FilterTypes(u8);

impl FilterTypes {
    pub const NONE: FilterTypes = FilterTypes(0);
    pub const ALL: FilterTypes = FilterTypes(0b11_1111);

    pub const fn of(types: &[FilterType]) -> Self {
        let mut mask = 0;
        let mut i = 0;
        while i < types.len() {
            mask |= types[i].bit();
            i += 1;
        }
        FilterTypes(mask)
    }

    pub const fn contains(self, filter_type: FilterType) -> bool {
        self.0 & filter_type.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// How a craft list accounts for its items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftListMode {
    /// Required quantities are worked down as items are crafted or acquired
    #[default]
    Normal,
    /// Required quantities are a stock level compared against inventories
    Stock,
}

// ═══════════════════════════════════════════════════════════════════════════
// Items
// ═══════════════════════════════════════════════════════════════════════════

/// Normal vs high quality variant of an item, counted separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemQuality {
    #[default]
    #[serde(alias = "nq")]
    Normal,
    #[serde(alias = "hq")]
    High,
}

impl fmt::Display for ItemQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("NQ"),
            Self::High => f.write_str("HQ"),
        }
    }
}

/// Why an item showed up in the player's inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionReason {
    Crafting,
    Gathering,
    Shopping,
    CombatDrop,
    Other,
    Marketboard,
}

impl AcquisitionReason {
    pub const ALL: [AcquisitionReason; 6] = [
        Self::Crafting,
        Self::Gathering,
        Self::Shopping,
        Self::CombatDrop,
        Self::Other,
        Self::Marketboard,
    ];
}

impl fmt::Display for AcquisitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Crafting => "Crafting",
            Self::Gathering => "Gathering",
            Self::Shopping => "Shopping",
            Self::CombatDrop => "Combat Drop",
            Self::Other => "Other",
            Self::Marketboard => "Marketboard",
        };
        f.write_str(label)
    }
}

/// Broad grouping of the game's inventory containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryCategory {
    CharacterBags,
    CharacterSaddleBags,
    CharacterPremiumSaddleBags,
    CharacterArmoryChest,
    CharacterEquipped,
    Armoire,
    GlamourChest,
    Currency,
    Crystals,
    RetainerBags,
    RetainerEquipped,
    RetainerMarket,
    FreeCompanyBags,
    HousingInteriorItems,
    HousingInteriorStoreroom,
    HousingExteriorItems,
    Other,
}

/// Whether a sorting list should consider items already sitting in retainers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterItemsRetainer {
    #[default]
    No,
    Yes,
    Only,
}

/// Kind of change recorded by the inventory history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryChangeReason {
    Added,
    Removed,
    Moved,
    QuantityChanged,
    FlagsChanged,
    SpiritbondChanged,
    ConditionChanged,
    MateriaChanged,
    GlamourChanged,
}

/// Source category an item can be obtained from, used by source filter rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    Shop,
    Gathering,
    Crafting,
    Fishing,
    Duty,
    Monster,
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Columns
// ═══════════════════════════════════════════════════════════════════════════

/// Grouping used when presenting the available columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnCategory {
    Basic,
    Inventory,
    Crafting,
    Market,
    Sources,
    Tools,
}

impl fmt::Display for ColumnCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Filter Rules
// ═══════════════════════════════════════════════════════════════════════════

/// Settings page a filter rule is shown on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    Basic,
    Columns,
    Display,
    Inventories,
    Acquisition,
    CraftTracking,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Wrapper {
        filter_type: FilterType,
        quality: ItemQuality,
        reason: AcquisitionReason,
    }

    #[test]
    fn test_serde_spellings() {
        let parsed: Wrapper = toml::from_str(
            r#"
filter_type = "craft_filter"
quality = "hq"
reason = "combat_drop"
"#,
        )
        .unwrap();
        assert_eq!(parsed.filter_type, FilterType::CraftFilter);
        assert_eq!(parsed.quality, ItemQuality::High);
        assert_eq!(parsed.reason, AcquisitionReason::CombatDrop);

        let written = toml::to_string(&parsed).unwrap();
        assert!(written.contains("filter_type = \"craft_filter\""));
        assert!(written.contains("quality = \"high\""));
    }

    #[test]
    fn test_filter_type_mask() {
        let mask = FilterTypes::of(&[FilterType::SearchFilter, FilterType::CraftFilter]);
        assert!(mask.contains(FilterType::SearchFilter));
        assert!(mask.contains(FilterType::CraftFilter));
        assert!(!mask.contains(FilterType::HistoryFilter));
        assert!(FilterType::ALL.iter().all(|t| FilterTypes::ALL.contains(*t)));
        assert!(FilterTypes::NONE.is_empty());
    }

    #[test]
    fn test_quality_display() {
        assert_eq!(ItemQuality::Normal.to_string(), "NQ");
        assert_eq!(ItemQuality::High.to_string(), "HQ");
    }
}
