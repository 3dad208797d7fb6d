//! Craft list reconciliation
//!
//! Turns scanner, craft and acquisition signals into craft list progress.
//! Two sources can report crafted items; [`TrackerSource`] decides which one
//! is honoured, and the choice is re-read for every event. Anything that does
//! not apply ends in a trace log and a [`Reconciliation::Ignored`] outcome,
//! never an error.

mod mode;
mod signal;


use std::collections::BTreeSet;
use std::time::Duration;

use chrono::NaiveDateTime;
use tally_types::{AcquisitionReason, CraftListMode, InventoryChangeReason, ItemQuality};

use crate::columns::ColumnRegistry;
use crate::context::AppConfig;
use crate::error::StoreError;
use crate::filters::{ColumnsFilter, FilterConfiguration, TrackingToggles};
use crate::inventory::{InventoryChange, ItemChanges};
use crate::lists::ListService;
use crate::services::Services;
use crate::state::{AutoSaveScheduler, AutoSaveTick, RecentlySeenCache};
use crate::store::{PendingSave, SaveWait};

pub use mode::TrackerSource;
pub use signal::InventorySignal;

// ═══════════════════════════════════════════════════════════════════════════
// Outcomes
// ═══════════════════════════════════════════════════════════════════════════

/// Why a craft or acquisition event changed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The event came from the source that is currently switched off
    InactiveSource(TrackerSource),
    NoActiveList,
    /// The active list is not a craft list
    NotCraftList,
    /// Stock lists are maintained by hand
    StockMode,
    /// Acquisitions only ever add
    NonPositiveQuantity,
    /// Start/fail events are only logged
    Informational,
}

/// What a craft or acquisition event did to the active craft list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Ignored(IgnoreReason),
    /// The list does not track items gained this way
    Suppressed(AcquisitionReason),
    /// Progress recorded and the list flagged for refresh
    Marked { list_key: String, completed: bool },
    /// An ephemeral list completed and was removed
    Removed { list_key: String, name: String },
}

impl Reconciliation {
    pub fn changed_counts(&self) -> bool {
        matches!(
            self,
            Reconciliation::Marked { .. } | Reconciliation::Removed { .. }
        )
    }
}

/// Work done for one inventory scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventorySync {
    pub snapshot_items: usize,
    pub price_checks: usize,
    pub newly_seen: usize,
}

/// Trackers switched to match the settings. `None` means left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigSync {
    pub mob_tracker: Option<bool>,
    pub history: Option<bool>,
    pub history_reasons_updated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    Craft(Reconciliation),
    Inventory(InventorySync),
    Configuration(ConfigSync),
    /// Whether the unlocked set was stored for a logged in character
    Unlocks(bool),
    Tick(AutoSaveTick),
}

/// What ran when the reconciler was brought up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    pub seeded_defaults: bool,
    pub config: ConfigSync,
    /// Owners whose cached inventories were dropped
    pub orphans: Vec<u64>,
}

#[derive(Debug)]
pub struct ShutdownReport {
    pub config_saved: bool,
    pub lists_saved: bool,
    pub inventories: SaveWait,
}

// ═══════════════════════════════════════════════════════════════════════════
// Reconciler
// ═══════════════════════════════════════════════════════════════════════════

/// Owns every list and all runtime bookkeeping. Meant to live on one task;
/// see [`crate::service`] for the async wrapper.
#[derive(Debug)]
pub struct Reconciler {
    config: AppConfig,
    lists: ListService,
    columns: ColumnsFilter,
    toggles: TrackingToggles,
    seen: RecentlySeenCache,
    autosave: AutoSaveScheduler,
    services: Services,
    /// Latest fire-and-forget inventory write
    pending_inventory_save: Option<PendingSave>,
}

impl Reconciler {
    pub fn new(config: AppConfig, lists: Vec<FilterConfiguration>, services: Services) -> Self {
        let columns = ColumnsFilter::new(ColumnRegistry::with_builtins());
        let mut lists = ListService::with_lists(lists);
        for list in lists.lists_mut() {
            let missing = list.bind_columns(columns.registry());
            if !missing.is_empty() {
                tracing::warn!(list = %list.name, ?missing, "List references unknown columns");
            }
        }
        Self {
            config,
            lists,
            columns,
            toggles: TrackingToggles::new(),
            seen: RecentlySeenCache::new(),
            autosave: AutoSaveScheduler::new(),
            services,
            pending_inventory_save: None,
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn lists(&self) -> &ListService {
        &self.lists
    }

    pub fn lists_mut(&mut self) -> &mut ListService {
        &mut self.lists
    }

    /// Lists and the columns rule together, for operations that seed columns
    pub fn lists_and_columns(&mut self) -> (&mut ListService, &ColumnsFilter) {
        (&mut self.lists, &self.columns)
    }

    pub fn columns(&self) -> &ColumnsFilter {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut ColumnsFilter {
        &mut self.columns
    }

    pub fn toggles(&self) -> &TrackingToggles {
        &self.toggles
    }

    pub fn seen(&self) -> &RecentlySeenCache {
        &self.seen
    }

    pub fn autosave(&self) -> &AutoSaveScheduler {
        &self.autosave
    }

    pub fn autosave_mut(&mut self) -> &mut AutoSaveScheduler {
        &mut self.autosave
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    // --- Dispatch ---

    pub fn handle_signal(&mut self, signal: InventorySignal) -> SignalOutcome {
        match signal {
            InventorySignal::InventoryChanged {
                changes,
                item_changes,
            } => SignalOutcome::Inventory(self.on_inventory_changed(&changes, item_changes.as_ref())),
            InventorySignal::CraftStarted { item_id } => {
                SignalOutcome::Craft(self.on_craft_started(item_id))
            }
            InventorySignal::CraftFailed { item_id } => {
                SignalOutcome::Craft(self.on_craft_failed(item_id))
            }
            InventorySignal::CraftCompleted {
                item_id,
                quality,
                quantity,
            } => SignalOutcome::Craft(self.on_craft_completed(item_id, quality, quantity)),
            InventorySignal::ItemAcquired {
                item_id,
                quality,
                quantity_increase,
                reason,
            } => SignalOutcome::Craft(self.on_item_acquired(
                item_id,
                quality,
                quantity_increase,
                reason,
            )),
            InventorySignal::ConfigurationChanged => {
                SignalOutcome::Configuration(self.on_configuration_changed())
            }
            InventorySignal::UnlocksChanged { unlocked } => {
                SignalOutcome::Unlocks(self.on_unlocks_changed(unlocked))
            }
            InventorySignal::Tick { now } => SignalOutcome::Tick(self.tick(now)),
        }
    }

    // ─── Legacy craft monitor ───────────────────────────────────────────────

    pub fn on_craft_started(&mut self, item_id: u32) -> Reconciliation {
        let source = TrackerSource::from_config(&self.config);
        if source != TrackerSource::CraftMonitor {
            tracing::trace!(item_id, %source, "Craft started ignored");
            return Reconciliation::Ignored(IgnoreReason::InactiveSource(source));
        }
        tracing::trace!(item_id, "Craft started");
        Reconciliation::Ignored(IgnoreReason::Informational)
    }

    pub fn on_craft_failed(&mut self, item_id: u32) -> Reconciliation {
        let source = TrackerSource::from_config(&self.config);
        if source != TrackerSource::CraftMonitor {
            tracing::trace!(item_id, %source, "Craft failed ignored");
            return Reconciliation::Ignored(IgnoreReason::InactiveSource(source));
        }
        tracing::trace!(item_id, "Craft failed");
        Reconciliation::Ignored(IgnoreReason::Informational)
    }

    pub fn on_craft_completed(
        &mut self,
        item_id: u32,
        quality: ItemQuality,
        quantity: u32,
    ) -> Reconciliation {
        let source = TrackerSource::from_config(&self.config);
        if source != TrackerSource::CraftMonitor {
            tracing::trace!(item_id, %quality, quantity, %source, "Craft completed ignored");
            return Reconciliation::Ignored(IgnoreReason::InactiveSource(source));
        }
        tracing::trace!(item_id, %quality, quantity, "Craft completed");

        if let Err(reason) = self.tracking_list() {
            tracing::trace!(item_id, ?reason, "No craft list to mark");
            return Reconciliation::Ignored(reason);
        }
        self.mark_active_list(item_id, quality, quantity)
    }

    // ─── Acquisition tracker ────────────────────────────────────────────────

    pub fn on_item_acquired(
        &mut self,
        item_id: u32,
        quality: ItemQuality,
        quantity_increase: i32,
        reason: AcquisitionReason,
    ) -> Reconciliation {
        let source = TrackerSource::from_config(&self.config);
        if source != TrackerSource::AcquisitionTracker {
            tracing::trace!(item_id, %quality, quantity_increase, %reason, %source, "Item acquisition ignored");
            return Reconciliation::Ignored(IgnoreReason::InactiveSource(source));
        }
        tracing::trace!(item_id, %quality, quantity_increase, %reason, "Item acquired");

        let quantity = match u32::try_from(quantity_increase) {
            Ok(quantity) if quantity > 0 => quantity,
            _ => {
                tracing::trace!(item_id, quantity_increase, "Acquisition without a gain");
                return Reconciliation::Ignored(IgnoreReason::NonPositiveQuantity);
            }
        };

        let list = match self.tracking_list() {
            Ok(list) => list,
            Err(ignore) => {
                tracing::trace!(item_id, ?ignore, "No craft list to mark");
                return Reconciliation::Ignored(ignore);
            }
        };
        if !self.toggles.tracks(reason, list) {
            tracing::trace!(item_id, %reason, list = %list.name, "Acquisition reason not tracked by list");
            return Reconciliation::Suppressed(reason);
        }
        self.mark_active_list(item_id, quality, quantity)
    }

    /// The active list, if automatic tracking may write into it
    fn tracking_list(&self) -> Result<&FilterConfiguration, IgnoreReason> {
        let Some(list) = self.lists.get_active_craft_list() else {
            return Err(IgnoreReason::NoActiveList);
        };
        let Some(craft_list) = list.active_craft_list() else {
            return Err(IgnoreReason::NotCraftList);
        };
        if craft_list.mode != CraftListMode::Normal {
            return Err(IgnoreReason::StockMode);
        }
        Ok(list)
    }

    /// Record progress on the active list, then either retire it (ephemeral
    /// and complete) or flag it for refresh. Callers check the gate first.
    fn mark_active_list(&mut self, item_id: u32, quality: ItemQuality, quantity: u32) -> Reconciliation {
        let Some(list) = self.lists.get_active_craft_list_mut() else {
            return Reconciliation::Ignored(IgnoreReason::NoActiveList);
        };
        let Some(craft_list) = list.active_craft_list_mut() else {
            return Reconciliation::Ignored(IgnoreReason::NotCraftList);
        };
        craft_list.mark_crafted(item_id, quality, quantity);
        let completed = craft_list.is_completed();
        let list_key = list.key.clone();

        if completed && list.is_ephemeral_craft_list {
            let name = list.name.clone();
            self.lists.remove_list(&list_key);
            self.services.chat.print(&format!(
                "Ephemeral craft list '{name}' completed. List has been removed."
            ));
            tracing::info!(list = %name, "Ephemeral craft list completed and removed");
            return Reconciliation::Removed { list_key, name };
        }

        list.needs_refresh = true;
        self.lists.mark_dirty();
        tracing::debug!(item_id, %quality, quantity, completed, "Craft list progress");
        Reconciliation::Marked {
            list_key,
            completed,
        }
    }

    // ─── Inventory scanner ──────────────────────────────────────────────────

    pub fn on_inventory_changed(
        &mut self,
        changes: &[InventoryChange],
        item_changes: Option<&ItemChanges>,
    ) -> InventorySync {
        let snapshot = self.services.inventories.all_items();
        let mut sync = InventorySync {
            snapshot_items: snapshot.len(),
            ..InventorySync::default()
        };
        // A still-running earlier write is superseded by this snapshot
        self.pending_inventory_save = Some(self.services.store.save_inventories(snapshot));

        if self.config.automatically_download_market_prices {
            if let Some(character) = self.services.characters.active_character() {
                for change in changes {
                    self.services
                        .market
                        .request_check(change.item_id, character.world_id, false);
                    sync.price_checks += 1;
                }
            }
        }

        if let Some(item_changes) = item_changes {
            for item in &item_changes.new_items {
                self.seen.record(item.clone());
                sync.newly_seen += 1;
            }
        }

        tracing::trace!(
            changes = changes.len(),
            price_checks = sync.price_checks,
            newly_seen = sync.newly_seen,
            "Inventory changed"
        );
        sync
    }

    // ─── Settings & unlocks ─────────────────────────────────────────────────

    /// Bring the external trackers in line with the stored settings
    pub fn on_configuration_changed(&mut self) -> ConfigSync {
        let mut sync = ConfigSync::default();

        let mob_tracker = &self.services.mob_tracker;
        if self.config.track_mob_spawns != mob_tracker.enabled() {
            if self.config.track_mob_spawns {
                mob_tracker.enable();
            } else {
                mob_tracker.disable();
            }
            sync.mob_tracker = Some(self.config.track_mob_spawns);
        }

        let history = &self.services.history;
        if self.config.history_enabled != history.enabled() {
            if self.config.history_enabled {
                history.enable();
            } else {
                history.disable();
            }
            sync.history = Some(self.config.history_enabled);
        }

        if let Some(reasons) = &self.config.history_track_reasons {
            let reasons: BTreeSet<InventoryChangeReason> = reasons.iter().copied().collect();
            if reasons != history.reasons_to_log() {
                history.set_reasons_to_log(reasons);
                sync.history_reasons_updated = true;
            }
        }

        tracing::debug!(?sync, "Configuration changed");
        sync
    }

    /// Store the unlocked items of the logged in character.
    /// Returns false when nobody is logged in.
    pub fn on_unlocks_changed(&mut self, unlocked: BTreeSet<u32>) -> bool {
        let character_id = self.services.characters.active_character_id();
        if character_id == 0 {
            tracing::trace!(count = unlocked.len(), "Unlocks changed without a character");
            return false;
        }
        tracing::debug!(character_id, count = unlocked.len(), "Storing unlocked items");
        self.config.set_acquired_items(character_id, unlocked);
        self.config.is_dirty = true;
        true
    }

    // ─── Housekeeping ───────────────────────────────────────────────────────

    /// Frame tick. Arms or fires the auto save timer while auto save is on.
    pub fn tick(&mut self, now: NaiveDateTime) -> AutoSaveTick {
        if !self.config.auto_save {
            return AutoSaveTick::Idle;
        }
        let tick = self.autosave.tick(now, self.config.auto_save_interval());
        match tick {
            AutoSaveTick::Fired => {
                tracing::debug!("Auto save due");
                self.config.is_dirty = true;
            }
            AutoSaveTick::Armed(at) => tracing::trace!(%at, "Auto save armed"),
            AutoSaveTick::Idle => {}
        }
        tick
    }

    /// Startup sequence: seed defaults on first run, sync trackers with the
    /// settings, then drop inventories of unknown owners
    pub fn start(&mut self) -> StartupReport {
        let report = StartupReport {
            seeded_defaults: self.load_default_data_if_first_run(),
            config: self.on_configuration_changed(),
            orphans: self.clear_orphans(),
        };
        tracing::info!(
            seeded_defaults = report.seeded_defaults,
            orphans = report.orphans.len(),
            lists = self.lists.len(),
            "Reconciler started"
        );
        report
    }

    /// Drop cached inventories of owners the character registry no longer knows
    pub fn clear_orphans(&mut self) -> Vec<u64> {
        let orphans: Vec<u64> = self
            .services
            .inventories
            .owners()
            .into_iter()
            .filter(|owner| self.services.characters.character(*owner).is_none())
            .collect();
        for owner in &orphans {
            tracing::info!(owner_id = owner, "Clearing orphaned inventories");
            self.services.inventories.clear_character_inventories(*owner);
        }
        orphans
    }

    /// Seed default lists on the very first start
    pub fn load_default_data_if_first_run(&mut self) -> bool {
        if !self.config.first_run {
            return false;
        }
        self.lists.load_default_data(&self.columns);
        self.config.first_run = false;
        self.config.is_dirty = true;
        true
    }

    // ─── Persistence ────────────────────────────────────────────────────────

    /// Write settings and lists if they changed. Dirty flags are cleared
    /// before writing; a failed write is not retried.
    pub fn flush(&mut self) -> Result<bool, StoreError> {
        let mut wrote = false;
        if std::mem::take(&mut self.config.is_dirty) {
            self.services.store.save_config(&self.config)?;
            wrote = true;
        }
        if self.lists.take_dirty() {
            self.services.store.save_lists(self.lists.lists())?;
            wrote = true;
        }
        Ok(wrote)
    }

    /// Whether the last inventory write has finished
    pub fn inventory_save_pending(&self) -> bool {
        self.pending_inventory_save
            .as_ref()
            .is_some_and(|save| !save.is_finished())
    }

    /// Final save. Settings and lists are written synchronously. Any earlier
    /// inventory write is awaited before the final snapshot is issued; both
    /// share the `timeout` budget, after which shutdown proceeds regardless.
    pub async fn shutdown(&mut self, timeout: Duration) -> ShutdownReport {
        self.autosave.clear();

        let config_saved = match self.services.store.save_config(&self.config) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save settings on shutdown");
                false
            }
        };
        let lists_saved = match self.services.store.save_lists(self.lists.lists()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save lists on shutdown");
                false
            }
        };

        let deadline = tokio::time::Instant::now() + timeout;
        if let Some(previous) = self.pending_inventory_save.take() {
            if let SaveWait::Failed(e) = previous.wait(timeout).await {
                tracing::warn!(error = %e, "Earlier inventory save failed");
            }
        }
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let snapshot = self.services.inventories.all_items();
        let inventories = self.services.store.save_inventories(snapshot).wait(remaining).await;
        match &inventories {
            SaveWait::Completed => tracing::debug!("Inventories saved"),
            SaveWait::Failed(e) => tracing::warn!(error = %e, "Failed to save inventories on shutdown"),
            SaveWait::TimedOut => {
                tracing::warn!(?timeout, "Timed out saving inventories, shutting down anyway")
            }
        }

        ShutdownReport {
            config_saved,
            lists_saved,
            inventories,
        }
    }
}
