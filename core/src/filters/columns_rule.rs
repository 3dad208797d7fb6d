//! The "Columns" rule: which columns a list displays, in which order

use std::collections::BTreeMap;
use std::sync::Arc;

use tally_types::{FilterCategory, FilterType, FilterTypes};

use super::FilterConfiguration;
use super::rules::FilterRule;
use crate::columns::{Column, ColumnConfiguration, ColumnGroup, ColumnRegistry};

/// Display name and help text of a configured column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDetails {
    pub display_name: String,
    pub help_text: Option<String>,
}

/// A list's columns in display order, each with its resolved details.
/// Order is significant and the same key may appear more than once.
pub type ColumnsValue = Vec<(ColumnConfiguration, ColumnDetails)>;

/// Edits the column sequence of a list. Owns the column registry so the
/// picker's grouped view can be memoised across frames.
#[derive(Debug)]
pub struct ColumnsFilter {
    registry: ColumnRegistry,
}

impl ColumnsFilter {
    pub fn new(registry: ColumnRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ColumnRegistry {
        &mut self.registry
    }

    /// Append a column configuration
    pub fn add_item(&self, configuration: &mut FilterConfiguration, item: ColumnConfiguration) {
        let mut value = self.current_value(configuration);
        value.push((item, ColumnDetails::empty()));
        self.update_filter_configuration(configuration, value);
    }

    /// Create a configuration for a registered column and append it.
    /// Returns the new configuration's instance id.
    pub fn add_column(&self, configuration: &mut FilterConfiguration, key: &str) -> Option<u64> {
        let Some(column) = self.registry.get(key) else {
            tracing::debug!(key, "Tried to add an unregistered column");
            return None;
        };
        let item = ColumnConfiguration::for_column(column);
        let instance = item.instance();
        self.add_item(configuration, item);
        Some(instance)
    }

    /// Remove a configuration by identity. Other entries with the same key stay.
    pub fn remove_item(&self, configuration: &mut FilterConfiguration, instance: u64) -> bool {
        let before = configuration.columns.len();
        configuration.columns.retain(|c| c.instance() != instance);
        before != configuration.columns.len()
    }

    /// Set the custom display/export names of one configuration.
    /// Empty strings mean "use the default".
    pub fn edit_item(
        &self,
        configuration: &mut FilterConfiguration,
        instance: u64,
        custom_name: &str,
        export_name: &str,
    ) -> bool {
        match configuration
            .columns
            .iter_mut()
            .find(|c| c.instance() == instance)
        {
            Some(column) => {
                column.set_names(custom_name, export_name);
                true
            }
            None => false,
        }
    }

    pub fn get_available_items(
        &self,
        configuration: &FilterConfiguration,
    ) -> BTreeMap<String, Arc<dyn Column>> {
        self.registry.available_items(configuration.filter_type)
    }

    pub fn get_grouped_items(&mut self, configuration: &FilterConfiguration) -> &[ColumnGroup] {
        self.registry.grouped_items(configuration.filter_type)
    }

    /// Append the list type's default columns
    pub fn add_default_columns(&self, configuration: &mut FilterConfiguration) {
        for column in self.registry.default_columns(configuration.filter_type) {
            self.add_item(configuration, ColumnConfiguration::for_column(column));
        }
    }

    /// Append default columns the list does not show yet. Returns how many were added.
    pub fn add_missing_default_columns(&self, configuration: &mut FilterConfiguration) -> usize {
        let missing: Vec<_> = self
            .registry
            .default_columns(configuration.filter_type)
            .into_iter()
            .filter(|column| configuration.get_column(column.key()).is_none())
            .collect();
        let added = missing.len();
        for column in missing {
            self.add_item(configuration, ColumnConfiguration::for_column(column));
        }
        added
    }
}

impl ColumnDetails {
    fn empty() -> Self {
        Self {
            display_name: String::new(),
            help_text: None,
        }
    }

    fn of(config: &ColumnConfiguration) -> Self {
        Self {
            display_name: config.display_name().to_string(),
            help_text: config.help_text().map(str::to_string),
        }
    }
}

impl FilterRule for ColumnsFilter {
    type Value = ColumnsValue;

    fn key(&self) -> &str {
        "Columns"
    }

    fn name(&self) -> &str {
        "Columns"
    }

    fn help_text(&self) -> &str {
        "Add a new column. Leave the column name blank if you want to use the default."
    }

    fn category(&self) -> FilterCategory {
        FilterCategory::Columns
    }

    fn available_in(&self) -> FilterTypes {
        FilterTypes::of(&FilterType::ALL)
    }

    fn default_value(&self) -> ColumnsValue {
        Vec::new()
    }

    fn current_value(&self, configuration: &FilterConfiguration) -> ColumnsValue {
        configuration
            .columns
            .iter()
            .map(|c| (c.clone(), ColumnDetails::of(c)))
            .collect()
    }

    /// Replace the column sequence with the value's configurations, in order
    fn update_filter_configuration(&self, configuration: &mut FilterConfiguration, value: ColumnsValue) {
        configuration.columns = value.into_iter().map(|(config, _)| config).collect();
    }

    fn has_value_set(&self, configuration: &FilterConfiguration) -> bool {
        !configuration.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ColumnsFilter {
        ColumnsFilter::new(ColumnRegistry::with_builtins())
    }

    #[test]
    fn test_current_value_resolves_names() {
        let columns = filter();
        let mut list = FilterConfiguration::new("All", FilterType::SearchFilter);
        let first = columns.add_column(&mut list, "NameColumn").unwrap();
        columns.add_column(&mut list, "QuantityColumn").unwrap();
        columns.edit_item(&mut list, first, "Item", "");

        let value = columns.current_value(&list);
        assert_eq!(value.len(), 2);
        assert_eq!(value[0].1.display_name, "Item");
        assert_eq!(value[1].1.display_name, "Total Quantity");
        assert!(value[1].1.help_text.is_some());
    }

    #[test]
    fn test_update_replaces_in_given_order() {
        let columns = filter();
        let mut list = FilterConfiguration::new("All", FilterType::SearchFilter);
        columns.add_column(&mut list, "NameColumn");
        columns.add_column(&mut list, "LocationColumn");

        let mut value = columns.current_value(&list);
        value.reverse();
        columns.update_filter_configuration(&mut list, value);
        assert_eq!(list.columns[0].key, "LocationColumn");
        assert_eq!(list.columns[1].key, "NameColumn");
    }

    #[test]
    fn test_duplicates_are_distinct_entries() {
        let columns = filter();
        let mut list = FilterConfiguration::new("All", FilterType::SearchFilter);
        let a = columns.add_column(&mut list, "NameColumn").unwrap();
        let b = columns.add_column(&mut list, "NameColumn").unwrap();
        columns.edit_item(&mut list, b, "", "name_export");

        assert_eq!(list.columns.len(), 2);
        assert!(list.columns[0].export_name.is_none());
        assert_eq!(list.columns[1].export_name.as_deref(), Some("name_export"));

        assert!(columns.remove_item(&mut list, a));
        assert_eq!(list.columns.len(), 1);
        assert_eq!(list.columns[0].instance(), b);
        assert!(!columns.remove_item(&mut list, a));
    }

    #[test]
    fn test_reset_and_has_value_set() {
        let columns = filter();
        let mut list = FilterConfiguration::new("All", FilterType::SearchFilter);
        assert!(!columns.has_value_set(&list));
        columns.add_default_columns(&mut list);
        assert!(columns.has_value_set(&list));

        columns.reset_filter(&mut list);
        assert!(!columns.has_value_set(&list));
    }

    #[test]
    fn test_add_missing_default_columns() {
        let columns = filter();
        let mut list = FilterConfiguration::new("Sort", FilterType::SortingFilter);
        columns.add_column(&mut list, "NameColumn");

        let added = columns.add_missing_default_columns(&mut list);
        assert_eq!(added, 3);
        assert_eq!(columns.add_missing_default_columns(&mut list), 0);
        assert_eq!(list.columns[0].key, "NameColumn");
    }

    #[test]
    fn test_unknown_column_not_added() {
        let columns = filter();
        let mut list = FilterConfiguration::new("All", FilterType::SearchFilter);
        assert!(columns.add_column(&mut list, "NoSuchColumn").is_none());
        assert!(list.columns.is_empty());
    }

    #[test]
    fn test_grouped_items_follow_list_type() {
        let mut columns = filter();
        let craft = FilterConfiguration::new("Craft", FilterType::CraftFilter);
        let craft_only_offered = columns
            .get_grouped_items(&craft)
            .iter()
            .flat_map(|g| g.columns.iter())
            .any(|(_, c)| c.craft_only());
        assert!(!craft_only_offered);
        assert!(columns.get_available_items(&craft).contains_key("CraftSimpleColumn"));
    }
}
