//! Collaborators the engine talks to
//!
//! The engine never reaches into the scanner, the market cache or the disk
//! directly. Each concern is a trait here, and a [`Services`] bundle carries
//! one shared handle per trait.

pub mod local;

use std::collections::BTreeSet;
use std::sync::Arc;

use tally_types::InventoryChangeReason;

use crate::context::AppConfig;
use crate::error::StoreError;
use crate::filters::FilterConfiguration;
use crate::inventory::{Character, InventoryItem};
use crate::store::PendingSave;

/// Persistence of settings, lists and inventory snapshots
pub trait ConfigurationStore: Send + Sync {
    fn save_config(&self, config: &AppConfig) -> Result<(), StoreError>;

    fn save_lists(&self, lists: &[FilterConfiguration]) -> Result<(), StoreError>;

    /// Start writing a full inventory snapshot. The caller does not wait on it.
    fn save_inventories(&self, items: Vec<InventoryItem>) -> PendingSave;
}

/// Cached inventories, as last scanned
pub trait InventoryMonitor: Send + Sync {
    fn all_items(&self) -> Vec<InventoryItem>;

    /// Owner ids that have at least one cached inventory
    fn owners(&self) -> Vec<u64>;

    fn clear_character_inventories(&self, owner_id: u64);
}

/// Characters, retainers and other inventory owners known to the client
pub trait CharacterMonitor: Send + Sync {
    /// Logged in character id, 0 when nobody is logged in
    fn active_character_id(&self) -> u64;

    fn active_character(&self) -> Option<Character>;

    fn character(&self, id: u64) -> Option<Character>;

    fn characters(&self) -> Vec<Character>;
}

pub trait MarketCache: Send + Sync {
    /// Queue a price check. Never blocks.
    fn request_check(&self, item_id: u32, world_id: u32, force: bool);
}

pub trait ChatOutput: Send + Sync {
    fn print(&self, message: &str);
}

/// A tracker that can be switched on and off at runtime
pub trait Toggleable: Send + Sync {
    fn enabled(&self) -> bool;

    fn enable(&self);

    fn disable(&self);
}

/// Inventory history recorder
pub trait HistoryLog: Toggleable {
    fn reasons_to_log(&self) -> BTreeSet<InventoryChangeReason>;

    fn set_reasons_to_log(&self, reasons: BTreeSet<InventoryChangeReason>);
}

/// Shared handles to every collaborator
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn ConfigurationStore>,
    pub inventories: Arc<dyn InventoryMonitor>,
    pub characters: Arc<dyn CharacterMonitor>,
    pub market: Arc<dyn MarketCache>,
    pub chat: Arc<dyn ChatOutput>,
    pub mob_tracker: Arc<dyn Toggleable>,
    pub history: Arc<dyn HistoryLog>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
