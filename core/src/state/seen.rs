use chrono::{Duration, NaiveDateTime};
use hashbrown::HashMap;

use crate::inventory::ItemChangesItem;

/// Items that newly showed up in an inventory scan, keyed by item id.
///
/// Entries never expire on their own. Callers decide what "recent" means by
/// looking at [`last_seen_elapsed`](Self::last_seen_elapsed).
#[derive(Debug, Default)]
pub struct RecentlySeenCache {
    items: HashMap<u32, ItemChangesItem>,
}

impl RecentlySeenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly seen item, replacing any earlier sighting of it
    pub fn record(&mut self, item: ItemChangesItem) {
        self.items.remove(&item.item_id);
        self.items.insert(item.item_id, item);
    }

    pub fn was_recently_seen(&self, item_id: u32) -> bool {
        self.items.contains_key(&item_id)
    }

    pub fn get(&self, item_id: u32) -> Option<&ItemChangesItem> {
        self.items.get(&item_id)
    }

    /// Time since the item was last seen, measured against `now`
    pub fn last_seen_elapsed(&self, item_id: u32, now: NaiveDateTime) -> Option<Duration> {
        self.items.get(&item_id).map(|item| now - item.date)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(secs: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, secs)
            .unwrap()
    }

    fn seen(item_id: u32, quantity: u32, date: NaiveDateTime) -> ItemChangesItem {
        ItemChangesItem {
            item_id,
            quantity,
            date,
        }
    }

    #[test]
    fn test_reappearing_item_replaces_entry() {
        let mut cache = RecentlySeenCache::new();
        cache.record(seen(5, 1, at(0)));
        cache.record(seen(5, 3, at(30)));

        assert_eq!(cache.len(), 1);
        let entry = cache.get(5).unwrap();
        assert_eq!(entry.date, at(30));
        assert_eq!(entry.quantity, 3);
    }

    #[test]
    fn test_elapsed_grows_with_now() {
        let mut cache = RecentlySeenCache::new();
        cache.record(seen(5, 1, at(0)));

        assert_eq!(cache.last_seen_elapsed(5, at(10)), Some(Duration::seconds(10)));
        assert_eq!(cache.last_seen_elapsed(5, at(40)), Some(Duration::seconds(40)));
        assert_eq!(cache.last_seen_elapsed(6, at(40)), None);
    }

    #[test]
    fn test_membership() {
        let mut cache = RecentlySeenCache::new();
        assert!(!cache.was_recently_seen(5));
        cache.record(seen(5, 1, at(0)));
        assert!(cache.was_recently_seen(5));
        cache.clear();
        assert!(cache.is_empty());
    }
}
