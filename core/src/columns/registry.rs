//! Registry of column behaviors

use std::collections::BTreeMap;
use std::sync::Arc;

use tally_types::{ColumnCategory, FilterType};

use super::{Column, ColumnConfiguration, builtin_columns};
use crate::error::ColumnError;

/// Columns of one category, sorted by name
#[derive(Debug, Clone)]
pub struct ColumnGroup {
    pub category: ColumnCategory,
    pub columns: Vec<(String, Arc<dyn Column>)>,
}

/// Every registered column behavior, keyed by `Column::key()`.
#[derive(Debug, Default)]
pub struct ColumnRegistry {
    columns: Vec<Arc<dyn Column>>,
    /// Grouped view for the last filter type asked about
    grouped: Option<(FilterType, Vec<ColumnGroup>)>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the builtin columns
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for column in builtin_columns() {
            if let Err(e) = registry.register(column) {
                tracing::warn!(error = %e, "Skipping builtin column");
            }
        }
        registry
    }

    pub fn register(&mut self, column: Arc<dyn Column>) -> Result<(), ColumnError> {
        if self.get(column.key()).is_some() {
            return Err(ColumnError::DuplicateKey(column.key().to_string()));
        }
        self.columns.push(column);
        self.grouped = None;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Column>> {
        self.columns.iter().find(|c| c.key() == key).cloned()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns that can be picked for a list of the given type
    pub fn available_items(&self, filter_type: FilterType) -> BTreeMap<String, Arc<dyn Column>> {
        self.columns
            .iter()
            .filter(|c| !c.craft_only() && c.available_in_type(filter_type))
            .map(|c| (c.key().to_string(), Arc::clone(c)))
            .collect()
    }

    /// Available columns grouped by category, groups in order of first
    /// appearance after sorting by name.
    ///
    /// The result is memoised for a single filter type; asking about a
    /// different type rebuilds it.
    pub fn grouped_items(&mut self, filter_type: FilterType) -> &[ColumnGroup] {
        let stale = !matches!(&self.grouped, Some((cached, _)) if *cached == filter_type);
        if stale {
            let groups = self.build_groups(filter_type);
            self.grouped = Some((filter_type, groups));
        }
        match &self.grouped {
            Some((_, groups)) => groups,
            None => &[],
        }
    }

    /// Filter type the grouped view is currently built for
    pub fn cached_filter_type(&self) -> Option<FilterType> {
        self.grouped.as_ref().map(|(filter_type, _)| *filter_type)
    }

    fn build_groups(&self, filter_type: FilterType) -> Vec<ColumnGroup> {
        let mut available: Vec<(String, Arc<dyn Column>)> =
            self.available_items(filter_type).into_iter().collect();
        available.sort_by(|a, b| a.1.name().cmp(b.1.name()));

        let mut groups: Vec<ColumnGroup> = Vec::new();
        for (key, column) in available {
            let category = column.category();
            match groups.iter_mut().find(|g| g.category == category) {
                Some(group) => group.columns.push((key, column)),
                None => groups.push(ColumnGroup {
                    category,
                    columns: vec![(key, column)],
                }),
            }
        }
        groups
    }

    /// Grouped columns whose name or help text matches a search query.
    /// Empty groups are dropped. An empty query matches everything.
    pub fn search(&mut self, filter_type: FilterType, query: &str) -> Vec<ColumnGroup> {
        let needle = parseable(query);
        self.grouped_items(filter_type)
            .iter()
            .filter_map(|group| {
                let columns: Vec<_> = group
                    .columns
                    .iter()
                    .filter(|(_, c)| {
                        needle.is_empty()
                            || parseable(c.name()).contains(&needle)
                            || parseable(c.help_text()).contains(&needle)
                    })
                    .cloned()
                    .collect();
                (!columns.is_empty()).then(|| ColumnGroup {
                    category: group.category,
                    columns,
                })
            })
            .collect()
    }

    /// Columns a new list of the given type starts with, craft-only ones included
    pub fn default_columns(&self, filter_type: FilterType) -> Vec<Arc<dyn Column>> {
        self.columns
            .iter()
            .filter(|c| c.available_in_type(filter_type) && c.default_in(filter_type))
            .cloned()
            .collect()
    }

    /// Attach the behavior to a configuration loaded from disk.
    /// Returns false when the key is no longer registered.
    pub fn bind(&self, config: &mut ColumnConfiguration) -> bool {
        match self.get(&config.key) {
            Some(column) => {
                config.bind(column);
                true
            }
            None => {
                tracing::debug!(key = %config.key, "Column no longer registered");
                false
            }
        }
    }
}

/// Lowercase and strip everything but letters and digits, for loose matching
pub fn parseable(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::BuiltinColumn;
    use tally_types::FilterTypes;

    #[test]
    fn test_available_items_skip_craft_only() {
        let registry = ColumnRegistry::with_builtins();
        let craft = registry.available_items(FilterType::CraftFilter);
        assert!(craft.contains_key("NameColumn"));
        assert!(craft.contains_key("CraftSimpleColumn"));
        assert!(!craft.contains_key("CraftAmountRequiredColumn"));

        let history = registry.available_items(FilterType::HistoryFilter);
        assert!(history.contains_key("HistoryChangeReasonColumn"));
        assert!(!history.contains_key("DestinationColumn"));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut registry = ColumnRegistry::with_builtins();
        let before = registry.len();
        let dup = BuiltinColumn {
            key: "NameColumn",
            name: "Other Name",
            help_text: "",
            category: ColumnCategory::Basic,
            available_in: FilterTypes::ALL,
            default_in: FilterTypes::NONE,
            craft_only: false,
            configurable: false,
        };
        assert_eq!(
            registry.register(Arc::new(dup)),
            Err(ColumnError::DuplicateKey("NameColumn".to_string()))
        );
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn test_grouped_items_memoised_per_type() {
        let mut registry = ColumnRegistry::with_builtins();
        assert_eq!(registry.cached_filter_type(), None);

        let sorting_has_destination = registry
            .grouped_items(FilterType::SortingFilter)
            .iter()
            .flat_map(|g| g.columns.iter())
            .any(|(key, _)| key == "DestinationColumn");
        assert!(sorting_has_destination);
        assert_eq!(registry.cached_filter_type(), Some(FilterType::SortingFilter));

        let search_has_destination = registry
            .grouped_items(FilterType::SearchFilter)
            .iter()
            .flat_map(|g| g.columns.iter())
            .any(|(key, _)| key == "DestinationColumn");
        assert!(!search_has_destination);
        assert_eq!(registry.cached_filter_type(), Some(FilterType::SearchFilter));
    }

    #[test]
    fn test_groups_sorted_by_name() {
        let mut registry = ColumnRegistry::with_builtins();
        for group in registry.grouped_items(FilterType::SearchFilter) {
            let names: Vec<&str> = group.columns.iter().map(|(_, c)| c.name()).collect();
            let mut sorted = names.clone();
            sorted.sort();
            assert_eq!(names, sorted);
            assert!(group.columns.iter().all(|(_, c)| c.category() == group.category));
        }
    }

    #[test]
    fn test_register_invalidates_memo() {
        let mut registry = ColumnRegistry::with_builtins();
        registry.grouped_items(FilterType::SearchFilter);
        let extra = BuiltinColumn {
            key: "GilColumn",
            name: "Gil",
            help_text: "Vendor sale price",
            category: ColumnCategory::Market,
            available_in: FilterTypes::ALL,
            default_in: FilterTypes::NONE,
            craft_only: false,
            configurable: false,
        };
        registry.register(Arc::new(extra)).unwrap();
        assert_eq!(registry.cached_filter_type(), None);
    }

    #[test]
    fn test_search_matches_name_and_help() {
        let mut registry = ColumnRegistry::with_builtins();
        let by_name = registry.search(FilterType::SearchFilter, "Last-Seen");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].columns[0].0, "LastSeenColumn");

        let by_help = registry.search(FilterType::SearchFilter, "market board");
        assert!(
            by_help
                .iter()
                .flat_map(|g| g.columns.iter())
                .any(|(key, _)| key == "MarketBoardPriceColumn")
        );

        let everything = registry.search(FilterType::SearchFilter, "");
        let total: usize = everything.iter().map(|g| g.columns.len()).sum();
        assert_eq!(total, registry.available_items(FilterType::SearchFilter).len());
    }

    #[test]
    fn test_default_columns_include_craft_only() {
        let registry = ColumnRegistry::with_builtins();
        let keys: Vec<String> = registry
            .default_columns(FilterType::CraftFilter)
            .iter()
            .map(|c| c.key().to_string())
            .collect();
        assert_eq!(
            keys,
            vec!["NameColumn", "CraftAmountRequiredColumn", "CraftAmountFulfilledColumn"]
        );
    }

    #[test]
    fn test_parseable() {
        assert_eq!(parseable("Last-Seen!"), "lastseen");
        assert_eq!(parseable("  iLevel 90 "), "ilevel90");
    }
}
