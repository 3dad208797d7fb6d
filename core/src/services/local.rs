//! In-process collaborators
//!
//! Used by the replay tool and by tests: inventories and characters are
//! plain in-memory tables, outbound requests are recorded so they can be
//! inspected afterwards.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tally_types::InventoryChangeReason;

use super::{
    CharacterMonitor, ChatOutput, ConfigurationStore, HistoryLog, InventoryMonitor, MarketCache,
    Services, Toggleable,
};
use crate::context::AppConfig;
use crate::error::StoreError;
use crate::filters::FilterConfiguration;
use crate::inventory::{Character, InventoryChange, InventoryItem};
use crate::store::PendingSave;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

/// Keeps the last saved state in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: Mutex<Option<AppConfig>>,
    lists: Mutex<Vec<FilterConfiguration>>,
    inventories: Arc<Mutex<Vec<InventoryItem>>>,
    config_saves: AtomicUsize,
    list_saves: AtomicUsize,
    inventory_saves: Arc<AtomicUsize>,
    /// Delay applied to inventory writes when a runtime is available
    inventory_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inventory writes complete only after `delay`
    pub fn with_inventory_delay(delay: Duration) -> Self {
        Self {
            inventory_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn config(&self) -> Option<AppConfig> {
        lock(&self.config).clone()
    }

    pub fn lists(&self) -> Vec<FilterConfiguration> {
        lock(&self.lists).clone()
    }

    pub fn inventories(&self) -> Vec<InventoryItem> {
        lock(&self.inventories).clone()
    }

    pub fn config_saves(&self) -> usize {
        self.config_saves.load(Ordering::SeqCst)
    }

    pub fn list_saves(&self) -> usize {
        self.list_saves.load(Ordering::SeqCst)
    }

    /// Completed inventory writes
    pub fn inventory_saves(&self) -> usize {
        self.inventory_saves.load(Ordering::SeqCst)
    }
}

impl ConfigurationStore for MemoryStore {
    fn save_config(&self, config: &AppConfig) -> Result<(), StoreError> {
        *lock(&self.config) = Some(config.clone());
        self.config_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn save_lists(&self, lists: &[FilterConfiguration]) -> Result<(), StoreError> {
        *lock(&self.lists) = lists.to_vec();
        self.list_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn save_inventories(&self, items: Vec<InventoryItem>) -> PendingSave {
        let target = Arc::clone(&self.inventories);
        let saves = Arc::clone(&self.inventory_saves);
        let commit = move |items: Vec<InventoryItem>| -> Result<(), StoreError> {
            *lock(&target) = items;
            saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        match (self.inventory_delay, tokio::runtime::Handle::try_current()) {
            (Some(delay), Ok(handle)) => PendingSave::Running(handle.spawn(async move {
                tokio::time::sleep(delay).await;
                commit(items)
            })),
            _ => PendingSave::Finished(commit(items)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inventories & characters
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryInventories {
    items: Mutex<Vec<InventoryItem>>,
}

impl MemoryInventories {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    pub fn insert(&self, item: InventoryItem) {
        lock(&self.items).push(item);
    }

    /// Apply scanned slot differences to the cached inventories
    pub fn apply_changes(&self, changes: &[InventoryChange]) {
        let mut items = lock(&self.items);
        for change in changes {
            let existing = items.iter().position(|i| {
                i.owner_id == change.owner_id
                    && i.category == change.category
                    && i.slot == change.slot
            });
            match (existing, change.to_quantity) {
                (Some(idx), 0) => {
                    items.remove(idx);
                }
                (Some(idx), quantity) => {
                    let item = &mut items[idx];
                    item.item_id = change.item_id;
                    item.quality = change.quality;
                    item.quantity = quantity;
                }
                (None, 0) => {}
                (None, quantity) => items.push(InventoryItem {
                    item_id: change.item_id,
                    quantity,
                    quality: change.quality,
                    owner_id: change.owner_id,
                    category: change.category,
                    slot: change.slot,
                }),
            }
        }
    }
}

impl InventoryMonitor for MemoryInventories {
    fn all_items(&self) -> Vec<InventoryItem> {
        lock(&self.items).clone()
    }

    fn owners(&self) -> Vec<u64> {
        let owners: BTreeSet<u64> = lock(&self.items).iter().map(|i| i.owner_id).collect();
        owners.into_iter().collect()
    }

    fn clear_character_inventories(&self, owner_id: u64) {
        lock(&self.items).retain(|i| i.owner_id != owner_id);
    }
}

#[derive(Debug, Default)]
pub struct MemoryCharacters {
    characters: Mutex<Vec<Character>>,
    active: AtomicU64,
}

impl MemoryCharacters {
    pub fn new(characters: Vec<Character>) -> Self {
        Self {
            characters: Mutex::new(characters),
            active: AtomicU64::new(0),
        }
    }

    pub fn add(&self, character: Character) {
        lock(&self.characters).push(character);
    }

    /// Log a character in (0 logs out)
    pub fn set_active(&self, id: u64) {
        self.active.store(id, Ordering::SeqCst);
    }
}

impl CharacterMonitor for MemoryCharacters {
    fn active_character_id(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    fn active_character(&self) -> Option<Character> {
        match self.active_character_id() {
            0 => None,
            id => self.character(id),
        }
    }

    fn character(&self, id: u64) -> Option<Character> {
        lock(&self.characters).iter().find(|c| c.id == id).cloned()
    }

    fn characters(&self) -> Vec<Character> {
        lock(&self.characters).clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outbound recorders
// ─────────────────────────────────────────────────────────────────────────────

/// A price check request as issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceCheck {
    pub item_id: u32,
    pub world_id: u32,
    pub force: bool,
}

#[derive(Debug, Default)]
pub struct RecordingMarket {
    requests: Mutex<Vec<PriceCheck>>,
}

impl RecordingMarket {
    pub fn requests(&self) -> Vec<PriceCheck> {
        lock(&self.requests).clone()
    }
}

impl MarketCache for RecordingMarket {
    fn request_check(&self, item_id: u32, world_id: u32, force: bool) {
        lock(&self.requests).push(PriceCheck {
            item_id,
            world_id,
            force,
        });
    }
}

#[derive(Debug, Default)]
pub struct RecordingChat {
    messages: Mutex<Vec<String>>,
}

impl RecordingChat {
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl ChatOutput for RecordingChat {
    fn print(&self, message: &str) {
        tracing::info!(text = message, "Chat");
        lock(&self.messages).push(message.to_string());
    }
}

#[derive(Debug, Default)]
pub struct LocalToggle {
    enabled: AtomicBool,
}

impl Toggleable for LocalToggle {
    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct MemoryHistory {
    toggle: LocalToggle,
    reasons: Mutex<BTreeSet<InventoryChangeReason>>,
    /// Times the reason filter was replaced
    reason_updates: AtomicUsize,
}

impl MemoryHistory {
    pub fn reason_updates(&self) -> usize {
        self.reason_updates.load(Ordering::SeqCst)
    }
}

impl Toggleable for MemoryHistory {
    fn enabled(&self) -> bool {
        self.toggle.enabled()
    }

    fn enable(&self) {
        self.toggle.enable();
    }

    fn disable(&self) {
        self.toggle.disable();
    }
}

impl HistoryLog for MemoryHistory {
    fn reasons_to_log(&self) -> BTreeSet<InventoryChangeReason> {
        lock(&self.reasons).clone()
    }

    fn set_reasons_to_log(&self, reasons: BTreeSet<InventoryChangeReason>) {
        *lock(&self.reasons) = reasons;
        self.reason_updates.fetch_add(1, Ordering::SeqCst);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bundle
// ─────────────────────────────────────────────────────────────────────────────

/// Concrete local collaborators, kept around for inspection
#[derive(Debug, Clone)]
pub struct LocalServices {
    pub store: Arc<MemoryStore>,
    pub inventories: Arc<MemoryInventories>,
    pub characters: Arc<MemoryCharacters>,
    pub market: Arc<RecordingMarket>,
    pub chat: Arc<RecordingChat>,
    pub mob_tracker: Arc<LocalToggle>,
    pub history: Arc<MemoryHistory>,
}

impl Default for LocalServices {
    fn default() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl LocalServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self {
            store: Arc::new(store),
            inventories: Arc::default(),
            characters: Arc::default(),
            market: Arc::default(),
            chat: Arc::default(),
            mob_tracker: Arc::default(),
            history: Arc::default(),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            store: self.store.clone(),
            inventories: self.inventories.clone(),
            characters: self.characters.clone(),
            market: self.market.clone(),
            chat: self.chat.clone(),
            mob_tracker: self.mob_tracker.clone(),
            history: self.history.clone(),
        }
    }

    /// Same collaborators, but persisting through another store
    pub fn services_with_store(&self, store: Arc<dyn ConfigurationStore>) -> Services {
        Services {
            store,
            ..self.services()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::{InventoryCategory, ItemQuality};

    fn change(slot: u16, item_id: u32, from: u32, to: u32) -> InventoryChange {
        InventoryChange {
            owner_id: 1,
            category: InventoryCategory::CharacterBags,
            slot,
            item_id,
            quality: ItemQuality::Normal,
            from_quantity: from,
            to_quantity: to,
        }
    }

    #[test]
    fn test_apply_changes() {
        let inventories = MemoryInventories::default();
        inventories.apply_changes(&[change(0, 100, 0, 3), change(1, 200, 0, 1)]);
        assert_eq!(inventories.all_items().len(), 2);

        inventories.apply_changes(&[change(0, 100, 3, 5), change(1, 200, 1, 0)]);
        let items = inventories.all_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(inventories.owners(), vec![1]);

        inventories.clear_character_inventories(1);
        assert!(inventories.all_items().is_empty());
    }

    #[test]
    fn test_active_character() {
        let characters = MemoryCharacters::new(vec![Character {
            id: 42,
            name: "Tester".to_string(),
            world_id: 7,
        }]);
        assert!(characters.active_character().is_none());
        characters.set_active(42);
        assert_eq!(characters.active_character().map(|c| c.world_id), Some(7));
        characters.set_active(99);
        assert!(characters.active_character().is_none());
    }

    #[test]
    fn test_bundle_shares_handles() {
        let local = LocalServices::new();
        let services = local.services();
        services.chat.print("hello");
        services.market.request_check(1, 2, false);
        services.history.enable();
        assert_eq!(local.chat.messages(), vec!["hello".to_string()]);
        assert_eq!(local.market.requests().len(), 1);
        assert!(local.history.enabled());
    }
}
