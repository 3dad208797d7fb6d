//! Columns shipped with the application

use std::sync::Arc;

use tally_types::{ColumnCategory, FilterType, FilterTypes};

use super::Column;

use FilterType::*;

const INVENTORY_LISTS: FilterTypes =
    FilterTypes::of(&[SearchFilter, SortingFilter, CuratedList, HistoryFilter]);
const ITEM_LISTS: FilterTypes = FilterTypes::of(&[
    SearchFilter,
    SortingFilter,
    GameItemFilter,
    CraftFilter,
    CuratedList,
]);

/// A column defined entirely by data
#[derive(Debug, Clone, Copy)]
pub struct BuiltinColumn {
    pub key: &'static str,
    pub name: &'static str,
    pub help_text: &'static str,
    pub category: ColumnCategory,
    pub available_in: FilterTypes,
    pub default_in: FilterTypes,
    pub craft_only: bool,
    pub configurable: bool,
}

impl Column for BuiltinColumn {
    fn key(&self) -> &str {
        self.key
    }

    fn name(&self) -> &str {
        self.name
    }

    fn help_text(&self) -> &str {
        self.help_text
    }

    fn category(&self) -> ColumnCategory {
        self.category
    }

    fn craft_only(&self) -> bool {
        self.craft_only
    }

    fn available_in_type(&self, filter_type: FilterType) -> bool {
        self.available_in.contains(filter_type)
    }

    fn default_in(&self, filter_type: FilterType) -> bool {
        self.default_in.contains(filter_type)
    }

    fn is_configurable(&self) -> bool {
        self.configurable
    }
}

const BUILTIN_COLUMNS: &[BuiltinColumn] = &[
    BuiltinColumn {
        key: "NameColumn",
        name: "Name",
        help_text: "The name of the item.",
        category: ColumnCategory::Basic,
        available_in: FilterTypes::ALL,
        default_in: FilterTypes::ALL,
        craft_only: false,
        configurable: false,
    },
    BuiltinColumn {
        key: "QuantityColumn",
        name: "Total Quantity",
        help_text: "The quantity of the item across the list's sources.",
        category: ColumnCategory::Inventory,
        available_in: INVENTORY_LISTS,
        default_in: FilterTypes::of(&[SearchFilter, SortingFilter, CuratedList, HistoryFilter]),
        craft_only: false,
        configurable: false,
    },
    BuiltinColumn {
        key: "LocationColumn",
        name: "Location",
        help_text: "The inventory and slot the item sits in.",
        category: ColumnCategory::Inventory,
        available_in: INVENTORY_LISTS,
        default_in: FilterTypes::of(&[SearchFilter, SortingFilter]),
        craft_only: false,
        configurable: false,
    },
    BuiltinColumn {
        key: "DestinationColumn",
        name: "Destination",
        help_text: "Where a sorting list suggests the item should be moved.",
        category: ColumnCategory::Inventory,
        available_in: FilterTypes::of(&[SortingFilter]),
        default_in: FilterTypes::of(&[SortingFilter]),
        craft_only: false,
        configurable: false,
    },
    BuiltinColumn {
        key: "LastSeenColumn",
        name: "Last Seen",
        help_text: "How long ago the item newly appeared in an inventory.",
        category: ColumnCategory::Inventory,
        available_in: FilterTypes::of(&[SearchFilter, SortingFilter, CuratedList]),
        default_in: FilterTypes::NONE,
        craft_only: false,
        configurable: false,
    },
    BuiltinColumn {
        key: "ItemLevelColumn",
        name: "iLevel",
        help_text: "The item level of the item.",
        category: ColumnCategory::Basic,
        available_in: FilterTypes::ALL,
        default_in: FilterTypes::NONE,
        craft_only: false,
        configurable: false,
    },
    BuiltinColumn {
        key: "UiCategoryColumn",
        name: "Category",
        help_text: "The item's category as shown in game.",
        category: ColumnCategory::Basic,
        available_in: FilterTypes::ALL,
        default_in: FilterTypes::of(&[GameItemFilter]),
        craft_only: false,
        configurable: false,
    },
    BuiltinColumn {
        key: "MarketBoardPriceColumn",
        name: "Market Price",
        help_text: "The cached market board price for the item on your world.",
        category: ColumnCategory::Market,
        available_in: ITEM_LISTS,
        default_in: FilterTypes::NONE,
        craft_only: false,
        configurable: true,
    },
    BuiltinColumn {
        key: "AcquisitionSourcesColumn",
        name: "Sources",
        help_text: "The ways the item can be obtained.",
        category: ColumnCategory::Sources,
        available_in: FilterTypes::ALL,
        default_in: FilterTypes::of(&[GameItemFilter]),
        craft_only: false,
        configurable: true,
    },
    BuiltinColumn {
        key: "HistoryChangeReasonColumn",
        name: "Change Reason",
        help_text: "Why the inventory history recorded this entry.",
        category: ColumnCategory::Inventory,
        available_in: FilterTypes::of(&[HistoryFilter]),
        default_in: FilterTypes::of(&[HistoryFilter]),
        craft_only: false,
        configurable: false,
    },
    BuiltinColumn {
        key: "FavouritesColumn",
        name: "Favourite",
        help_text: "Mark the item as a favourite.",
        category: ColumnCategory::Tools,
        available_in: FilterTypes::ALL,
        default_in: FilterTypes::NONE,
        craft_only: false,
        configurable: false,
    },
    BuiltinColumn {
        key: "CraftAmountRequiredColumn",
        name: "Required",
        help_text: "How many of the item the craft list needs.",
        category: ColumnCategory::Crafting,
        available_in: FilterTypes::of(&[CraftFilter]),
        default_in: FilterTypes::of(&[CraftFilter]),
        craft_only: true,
        configurable: false,
    },
    BuiltinColumn {
        key: "CraftAmountFulfilledColumn",
        name: "Crafted",
        help_text: "How many of the item have been crafted or acquired for the list.",
        category: ColumnCategory::Crafting,
        available_in: FilterTypes::of(&[CraftFilter]),
        default_in: FilterTypes::of(&[CraftFilter]),
        craft_only: true,
        configurable: false,
    },
    BuiltinColumn {
        key: "CraftSimpleColumn",
        name: "Next Step",
        help_text: "What to do next to complete the item.",
        category: ColumnCategory::Crafting,
        available_in: FilterTypes::of(&[CraftFilter]),
        default_in: FilterTypes::NONE,
        craft_only: false,
        configurable: false,
    },
];

/// Every builtin column as a registry-ready behavior
pub fn builtin_columns() -> Vec<Arc<dyn Column>> {
    BUILTIN_COLUMNS
        .iter()
        .map(|c| Arc::new(*c) as Arc<dyn Column>)
        .collect()
}
