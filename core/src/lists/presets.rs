//! Lists seeded on first run, and the sample lists offered in the list menu

use tally_types::{FilterItemsRetainer, FilterType, InventoryCategory, SourceCategory};

use super::ListService;
use crate::filters::rules::{buy_from_vendor_price_rule, favourites_rule, source_category_rule};
use crate::filters::{ColumnsFilter, FilterConfiguration, FilterRule};

fn search_list(name: &str) -> FilterConfiguration {
    let mut list = FilterConfiguration::new(name, FilterType::SearchFilter);
    list.display_in_tabs = true;
    list
}

impl ListService {
    /// Seed the default craft list and the standard lists
    pub fn load_default_data(&mut self, columns: &ColumnsFilter) {
        self.get_default_craft_list(columns);

        let mut all = search_list("All");
        all.source_all_characters = true;
        all.source_all_retainers = true;
        all.source_all_free_companies = true;
        all.source_all_houses = true;
        self.add_list_with_defaults(all, columns);

        let mut retainers = search_list("Retainers");
        retainers.source_all_retainers = true;
        self.add_list_with_defaults(retainers, columns);

        let mut player = search_list("Player");
        player.source_all_characters = true;
        self.add_list_with_defaults(player, columns);

        let mut free_company = search_list("Free Company");
        free_company.source_all_free_companies = true;
        self.add_list_with_defaults(free_company, columns);

        let mut housing = search_list("Housing");
        housing.source_all_houses = true;
        self.add_list_with_defaults(housing, columns);

        let mut game_items = FilterConfiguration::new("All Game Items", FilterType::GameItemFilter);
        game_items.display_in_tabs = true;
        self.add_list_with_defaults(game_items, columns);

        let mut favourites = FilterConfiguration::new("Favourites", FilterType::GameItemFilter);
        favourites.display_in_tabs = true;
        favourites_rule().update_filter_configuration(&mut favourites, Some(true));
        self.add_list_with_defaults(favourites, columns);

        let key = self.add_new_craft_list(None, columns);
        if let Some(craft) = self.get_mut(&key) {
            craft.display_in_tabs = true;
        }

        let mut history = FilterConfiguration::new("History", FilterType::HistoryFilter);
        history.display_in_tabs = true;
        history.source_all_characters = true;
        history.source_all_retainers = true;
        history.source_all_free_companies = true;
        history.source_all_houses = true;
        self.add_list_with_defaults(history, columns);

        tracing::info!(lists = self.len(), "Seeded default lists");
    }

    /// Items buyable from a shop for 100 gil or less
    pub fn add_sample_filter_100_gil(&mut self, columns: &ColumnsFilter) -> String {
        let mut list = search_list("100 gil or less");
        list.source_all_characters = true;
        list.source_all_retainers = true;
        source_category_rule(SourceCategory::Shop).update_filter_configuration(&mut list, Some(true));
        buy_from_vendor_price_rule().update_filter_configuration(&mut list, "<=100".to_string());
        self.add_list_with_defaults(list, columns)
    }

    /// Gatherable materials in the character's bags that belong on a retainer
    pub fn add_sample_filter_materials(&mut self, columns: &ColumnsFilter) -> String {
        let mut list = FilterConfiguration::new("Put away materials", FilterType::SortingFilter);
        list.display_in_tabs = true;
        list.source_categories.insert(InventoryCategory::CharacterBags);
        list.destination_categories.insert(InventoryCategory::RetainerBags);
        list.filter_items_in_retainers = FilterItemsRetainer::Yes;
        list.highlight_when = Some("Always".to_string());
        source_category_rule(SourceCategory::Gathering)
            .update_filter_configuration(&mut list, Some(true));
        self.add_list_with_defaults(list, columns)
    }

    /// Stacks split between bags and retainers that could be merged
    pub fn add_sample_filter_duplicated_items(&mut self, columns: &ColumnsFilter) -> String {
        let mut list = FilterConfiguration::new("Duplicated SortItems", FilterType::SortingFilter);
        list.display_in_tabs = true;
        list.source_categories.insert(InventoryCategory::CharacterBags);
        list.source_categories.insert(InventoryCategory::RetainerBags);
        list.destination_categories.insert(InventoryCategory::RetainerBags);
        list.duplicates_only = true;
        self.add_list_with_defaults(list, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnRegistry;
    use crate::lists::DEFAULT_CRAFT_LIST_NAME;

    fn columns() -> ColumnsFilter {
        ColumnsFilter::new(ColumnRegistry::with_builtins())
    }

    #[test]
    fn test_default_data() {
        let columns = columns();
        let mut lists = ListService::new();
        lists.load_default_data(&columns);

        let names: Vec<&str> = lists.lists().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                DEFAULT_CRAFT_LIST_NAME,
                "All",
                "Retainers",
                "Player",
                "Free Company",
                "Housing",
                "All Game Items",
                "Favourites",
                "Craft List",
                "History",
            ]
        );

        let retainers = lists.find_by_name("Retainers").unwrap();
        assert!(retainers.source_all_retainers);
        assert!(!retainers.source_all_characters);
        assert!(!retainers.columns.is_empty());

        let favourites = lists.find_by_name("Favourites").unwrap();
        assert!(favourites_rule().enabled(favourites));

        let default_craft = lists.find_by_name(DEFAULT_CRAFT_LIST_NAME).unwrap();
        assert!(!default_craft.display_in_tabs);
        assert!(lists.find_by_name("Craft List").unwrap().display_in_tabs);
    }

    #[test]
    fn test_sample_lists() {
        let columns = columns();
        let mut lists = ListService::new();

        let cheap = lists.add_sample_filter_100_gil(&columns);
        let cheap = lists.get(&cheap).unwrap();
        assert_eq!(buy_from_vendor_price_rule().current_value(cheap), "<=100");
        assert!(source_category_rule(SourceCategory::Shop).enabled(cheap));

        let materials = lists.add_sample_filter_materials(&columns);
        let materials = lists.get(&materials).unwrap();
        assert_eq!(materials.filter_type, FilterType::SortingFilter);
        assert_eq!(materials.filter_items_in_retainers, FilterItemsRetainer::Yes);
        assert!(materials.destination_categories.contains(&InventoryCategory::RetainerBags));

        let duplicates = lists.add_sample_filter_duplicated_items(&columns);
        let duplicates = lists.get(&duplicates).unwrap();
        assert!(duplicates.duplicates_only);
        assert_eq!(duplicates.source_categories.len(), 2);
    }
}
