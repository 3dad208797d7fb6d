//! List registry
//!
//! Owns every [`FilterConfiguration`] and knows which one is the active
//! craft list, i.e. the list automatic craft tracking writes into.

mod presets;

use tally_types::{CraftListMode, FilterType};

use crate::filters::{ColumnsFilter, FilterConfiguration};

pub const DEFAULT_CRAFT_LIST_NAME: &str = "Default Craft List";
pub const NEW_CRAFT_LIST_NAME: &str = "Craft List";

#[derive(Debug, Default)]
pub struct ListService {
    lists: Vec<FilterConfiguration>,
    active_craft_list: Option<String>,
    /// Set whenever lists are added or removed
    dirty: bool,
}

impl ListService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with previously saved lists
    pub fn with_lists(lists: Vec<FilterConfiguration>) -> Self {
        Self {
            lists,
            ..Self::default()
        }
    }

    // --- Registration ---

    /// Register a list. A list whose key is already registered is rejected.
    pub fn add_list(&mut self, list: FilterConfiguration) -> bool {
        if self.get(&list.key).is_some() {
            tracing::warn!(key = %list.key, name = %list.name, "List already registered");
            return false;
        }
        tracing::debug!(key = %list.key, name = %list.name, "Adding list");
        self.lists.push(list);
        self.dirty = true;
        true
    }

    /// Register an imported list. Explicit inventories refer to another
    /// player's characters, so they are dropped first.
    pub fn add_filter(&mut self, mut list: FilterConfiguration) -> bool {
        list.destination_inventories.clear();
        list.source_inventories.clear();
        self.add_list(list)
    }

    pub fn remove_list(&mut self, key: &str) -> Option<FilterConfiguration> {
        let idx = self.lists.iter().position(|l| l.key == key)?;
        let removed = self.lists.remove(idx);
        if self.active_craft_list.as_deref() == Some(key) {
            self.active_craft_list = None;
        }
        tracing::debug!(key, name = %removed.name, "Removed list");
        self.dirty = true;
        Some(removed)
    }

    // --- Accessors ---

    pub fn get(&self, key: &str) -> Option<&FilterConfiguration> {
        self.lists.iter().find(|l| l.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FilterConfiguration> {
        self.lists.iter_mut().find(|l| l.key == key)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&FilterConfiguration> {
        self.lists.iter().find(|l| l.name == name)
    }

    pub fn lists(&self) -> &[FilterConfiguration] {
        &self.lists
    }

    pub fn lists_mut(&mut self) -> impl Iterator<Item = &mut FilterConfiguration> {
        self.lists.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Flag lists for the next save
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether lists changed since the last call, and clears the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // --- Active craft list ---

    /// Designate the list automatic craft tracking writes into.
    /// Any registered list may be designated; non-craft lists are ignored
    /// by tracking.
    pub fn set_active_craft_list(&mut self, key: Option<&str>) -> bool {
        match key {
            Some(key) if self.get(key).is_none() => false,
            key => {
                self.active_craft_list = key.map(str::to_string);
                true
            }
        }
    }

    pub fn active_craft_list_key(&self) -> Option<&str> {
        self.active_craft_list.as_deref()
    }

    pub fn get_active_craft_list(&self) -> Option<&FilterConfiguration> {
        self.get(self.active_craft_list.as_deref()?)
    }

    pub fn get_active_craft_list_mut(&mut self) -> Option<&mut FilterConfiguration> {
        let key = self.active_craft_list.clone()?;
        self.get_mut(&key)
    }

    // --- Craft lists ---

    /// The hidden craft list new craft lists copy their columns from.
    /// Created on first use.
    pub fn get_default_craft_list(&mut self, columns: &ColumnsFilter) -> &FilterConfiguration {
        let idx = match self
            .lists
            .iter()
            .position(|l| l.is_craft_list() && l.name == DEFAULT_CRAFT_LIST_NAME && !l.display_in_tabs)
        {
            Some(idx) => idx,
            None => {
                let mut list =
                    FilterConfiguration::new_craft_list(DEFAULT_CRAFT_LIST_NAME, CraftListMode::Normal);
                columns.add_default_columns(&mut list);
                self.lists.push(list);
                self.dirty = true;
                self.lists.len() - 1
            }
        };
        &self.lists[idx]
    }

    /// Create and register a craft list, returning its key
    pub fn add_new_craft_list(&mut self, name: Option<&str>, columns: &ColumnsFilter) -> String {
        let template_columns = self.get_default_craft_list(columns).columns.clone();
        let mut list = FilterConfiguration::new_craft_list(
            name.unwrap_or(NEW_CRAFT_LIST_NAME),
            CraftListMode::Normal,
        );
        list.columns = template_columns
            .into_iter()
            .map(|c| {
                let mut copy = crate::columns::ColumnConfiguration::new(c.key.clone());
                copy.name = c.name.clone();
                copy.export_name = c.export_name.clone();
                if let Some(column) = c.column() {
                    copy.bind(column.clone());
                }
                copy
            })
            .collect();
        if list.columns.is_empty() {
            columns.add_default_columns(&mut list);
        }
        let key = list.key.clone();
        self.add_list(list);
        key
    }

    /// A craft list that removes itself once complete
    pub fn add_ephemeral_craft_list(&mut self, name: &str, columns: &ColumnsFilter) -> String {
        let key = self.add_new_craft_list(Some(name), columns);
        if let Some(list) = self.get_mut(&key) {
            list.is_ephemeral_craft_list = true;
        }
        key
    }

    /// Register a list after seeding its type's default columns
    pub fn add_list_with_defaults(
        &mut self,
        mut list: FilterConfiguration,
        columns: &ColumnsFilter,
    ) -> String {
        columns.add_default_columns(&mut list);
        let key = list.key.clone();
        self.add_list(list);
        key
    }

    /// Lists of a given type, in registration order
    pub fn lists_of_type(&self, filter_type: FilterType) -> impl Iterator<Item = &FilterConfiguration> {
        self.lists.iter().filter(move |l| l.filter_type == filter_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnRegistry;

    fn columns() -> ColumnsFilter {
        ColumnsFilter::new(ColumnRegistry::with_builtins())
    }

    #[test]
    fn test_removing_active_list_clears_designation() {
        let columns = columns();
        let mut lists = ListService::new();
        let key = lists.add_new_craft_list(Some("Goal"), &columns);
        assert!(lists.set_active_craft_list(Some(&key)));
        assert_eq!(lists.get_active_craft_list().map(|l| l.name.as_str()), Some("Goal"));

        assert!(lists.remove_list(&key).is_some());
        assert!(lists.get_active_craft_list().is_none());
        assert!(lists.active_craft_list_key().is_none());
    }

    #[test]
    fn test_cannot_activate_unknown_list() {
        let mut lists = ListService::new();
        assert!(!lists.set_active_craft_list(Some("missing")));
        assert!(lists.set_active_craft_list(None));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut lists = ListService::new();
        let list = FilterConfiguration::new("All", FilterType::SearchFilter);
        assert!(lists.add_list(list.clone()));
        assert!(!lists.add_list(list));
        assert_eq!(lists.len(), 1);
    }

    #[test]
    fn test_new_craft_lists_copy_template_columns() {
        let columns = columns();
        let mut lists = ListService::new();
        let template_len = lists.get_default_craft_list(&columns).columns.len();
        assert!(template_len > 0);

        let key = lists.add_new_craft_list(None, &columns);
        let list = lists.get(&key).unwrap();
        assert_eq!(list.name, NEW_CRAFT_LIST_NAME);
        assert_eq!(list.columns.len(), template_len);
        assert!(list.columns.iter().all(|c| c.is_bound()));
        assert_eq!(lists.lists_of_type(FilterType::CraftFilter).count(), 2);
    }

    #[test]
    fn test_ephemeral_craft_list_flag() {
        let columns = columns();
        let mut lists = ListService::new();
        let key = lists.add_ephemeral_craft_list("Quick", &columns);
        assert!(lists.get(&key).unwrap().is_ephemeral_craft_list);
    }

    #[test]
    fn test_add_filter_clears_explicit_inventories() {
        use crate::filters::InventoryRef;
        use tally_types::InventoryCategory;

        let mut lists = ListService::new();
        let mut imported = FilterConfiguration::new("Imported", FilterType::SortingFilter);
        imported.source_inventories.push(InventoryRef {
            owner_id: 99,
            category: InventoryCategory::CharacterBags,
        });
        imported.destination_inventories.push(InventoryRef {
            owner_id: 99,
            category: InventoryCategory::RetainerBags,
        });
        let key = imported.key.clone();
        assert!(lists.add_filter(imported));

        let stored = lists.get(&key).unwrap();
        assert!(stored.source_inventories.is_empty());
        assert!(stored.destination_inventories.is_empty());
    }

    #[test]
    fn test_dirty_flag() {
        let mut lists = ListService::new();
        assert!(!lists.take_dirty());
        lists.add_list(FilterConfiguration::new("All", FilterType::SearchFilter));
        assert!(lists.take_dirty());
        assert!(!lists.take_dirty());
    }
}
