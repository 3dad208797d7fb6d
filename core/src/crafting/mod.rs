//! Craft list state
//!
//! A craft list records how many of each item (per quality) the player needs
//! and how many have been crafted or acquired towards that goal. Fulfilled
//! counts only ever grow through [`CraftList::mark_crafted`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tally_types::{CraftListMode, ItemQuality};

/// Counting key: the same item in NQ and HQ is tracked separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub item_id: u32,
    #[serde(default)]
    pub quality: ItemQuality,
}

impl ItemKey {
    pub fn new(item_id: u32, quality: ItemQuality) -> Self {
        Self { item_id, quality }
    }

    pub fn nq(item_id: u32) -> Self {
        Self::new(item_id, ItemQuality::Normal)
    }

    pub fn hq(item_id: u32) -> Self {
        Self::new(item_id, ItemQuality::High)
    }
}

/// One row of a craft list, as shown or exported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CraftProgress {
    pub key: ItemKey,
    pub required: u32,
    pub fulfilled: u32,
}

impl CraftProgress {
    pub fn remaining(&self) -> u32 {
        self.required.saturating_sub(self.fulfilled)
    }

    pub fn is_done(&self) -> bool {
        self.fulfilled >= self.required
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftList {
    pub mode: CraftListMode,
    #[serde(with = "item_map")]
    required: HashMap<ItemKey, u32>,
    #[serde(with = "item_map")]
    crafted: HashMap<ItemKey, u32>,
    /// Latched once every required entry is fulfilled
    completed: bool,
}

impl CraftList {
    pub fn new(mode: CraftListMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Add to the required count for an item
    pub fn add_required(&mut self, item_id: u32, quality: ItemQuality, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let entry = self.required.entry(ItemKey::new(item_id, quality)).or_default();
        *entry = entry.saturating_add(quantity);
        self.refresh_completion();
    }

    /// Set the required count for an item; zero removes the requirement
    pub fn set_required(&mut self, item_id: u32, quality: ItemQuality, quantity: u32) {
        let key = ItemKey::new(item_id, quality);
        if quantity == 0 {
            self.required.remove(&key);
        } else {
            self.required.insert(key, quantity);
        }
        self.refresh_completion();
    }

    /// Record `quantity` more of an item as crafted/acquired.
    ///
    /// Additive only. Duplicate delivery of the same underlying event is
    /// counted twice; there is no idempotency key to deduplicate on.
    pub fn mark_crafted(&mut self, item_id: u32, quality: ItemQuality, quantity: u32) {
        let entry = self.crafted.entry(ItemKey::new(item_id, quality)).or_default();
        *entry = entry.saturating_add(quantity);
        self.refresh_completion();
    }

    /// True once there is at least one requirement and all of them have been
    /// met. Stays true for the rest of the list's life.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn required_quantity(&self, key: ItemKey) -> u32 {
        self.required.get(&key).copied().unwrap_or(0)
    }

    pub fn crafted_quantity(&self, key: ItemKey) -> u32 {
        self.crafted.get(&key).copied().unwrap_or(0)
    }

    pub fn has_requirements(&self) -> bool {
        !self.required.is_empty()
    }

    /// Progress for every required item, ordered by item then quality
    pub fn progress(&self) -> Vec<CraftProgress> {
        let mut rows: Vec<CraftProgress> = self
            .required
            .iter()
            .map(|(key, required)| CraftProgress {
                key: *key,
                required: *required,
                fulfilled: self.crafted_quantity(*key),
            })
            .collect();
        rows.sort_by_key(|row| row.key);
        rows
    }

    /// (fulfilled, required) summed over all requirements, with overshoot capped
    pub fn totals(&self) -> (u64, u64) {
        self.progress().iter().fold((0, 0), |(done, total), row| {
            (
                done + u64::from(row.fulfilled.min(row.required)),
                total + u64::from(row.required),
            )
        })
    }

    fn all_fulfilled(&self) -> bool {
        !self.required.is_empty()
            && self
                .required
                .iter()
                .all(|(key, required)| self.crafted_quantity(*key) >= *required)
    }

    fn refresh_completion(&mut self) {
        if !self.completed && self.all_fulfilled() {
            self.completed = true;
        }
    }
}

/// Serialize an item-keyed map as a list of entries, since JSON object keys
/// must be strings.
mod item_map {
    use std::collections::HashMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::ItemKey;

    #[derive(Serialize, Deserialize)]
    struct Entry {
        #[serde(flatten)]
        key: ItemKey,
        quantity: u32,
    }

    pub fn serialize<S: Serializer>(
        map: &HashMap<ItemKey, u32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<Entry> = map
            .iter()
            .map(|(key, quantity)| Entry {
                key: *key,
                quantity: *quantity,
            })
            .collect();
        entries.sort_by_key(|e| e.key);
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<ItemKey, u32>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries.into_iter().map(|e| (e.key, e.quantity)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_not_completed() {
        let mut list = CraftList::default();
        assert!(!list.is_completed());
        list.mark_crafted(100, ItemQuality::Normal, 3);
        assert!(!list.is_completed());
    }

    #[test]
    fn test_completes_when_every_requirement_met() {
        let mut list = CraftList::default();
        list.add_required(100, ItemQuality::Normal, 5);
        list.add_required(200, ItemQuality::High, 1);

        list.mark_crafted(100, ItemQuality::Normal, 3);
        assert!(!list.is_completed());
        list.mark_crafted(100, ItemQuality::Normal, 2);
        assert!(!list.is_completed());
        assert_eq!(list.crafted_quantity(ItemKey::nq(100)), 5);

        list.mark_crafted(200, ItemQuality::High, 1);
        assert!(list.is_completed());
    }

    #[test]
    fn test_quality_counted_separately() {
        let mut list = CraftList::default();
        list.add_required(100, ItemQuality::High, 2);
        list.mark_crafted(100, ItemQuality::Normal, 5);
        assert!(!list.is_completed());
        assert_eq!(list.crafted_quantity(ItemKey::hq(100)), 0);
        assert_eq!(list.crafted_quantity(ItemKey::nq(100)), 5);
    }

    #[test]
    fn test_completion_never_reverts() {
        let mut list = CraftList::default();
        list.add_required(1, ItemQuality::Normal, 1);
        list.mark_crafted(1, ItemQuality::Normal, 1);
        assert!(list.is_completed());

        list.mark_crafted(1, ItemQuality::Normal, 4);
        list.mark_crafted(2, ItemQuality::Normal, 1);
        list.add_required(3, ItemQuality::Normal, 10);
        assert!(list.is_completed());
    }

    #[test]
    fn test_counts_saturate() {
        let mut list = CraftList::default();
        list.mark_crafted(1, ItemQuality::Normal, u32::MAX);
        list.mark_crafted(1, ItemQuality::Normal, 10);
        assert_eq!(list.crafted_quantity(ItemKey::nq(1)), u32::MAX);
    }

    #[test]
    fn test_progress_and_totals() {
        let mut list = CraftList::default();
        list.set_required(20, ItemQuality::Normal, 4);
        list.set_required(10, ItemQuality::Normal, 2);
        list.mark_crafted(10, ItemQuality::Normal, 5);
        list.mark_crafted(20, ItemQuality::Normal, 1);

        let rows = list.progress();
        assert_eq!(rows[0].key, ItemKey::nq(10));
        assert!(rows[0].is_done());
        assert_eq!(rows[1].remaining(), 3);
        assert_eq!(list.totals(), (3, 6));

        list.set_required(20, ItemQuality::Normal, 0);
        assert!(list.is_completed());
    }

    #[test]
    fn test_serialized_as_entries() {
        let mut list = CraftList::default();
        list.add_required(7, ItemQuality::High, 2);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json["required"],
            serde_json::json!([{ "item_id": 7, "quality": "high", "quantity": 2 }])
        );
        let back: CraftList = serde_json::from_value(json).unwrap();
        assert_eq!(back.required_quantity(ItemKey::hq(7)), 2);
    }
}
