//! File-backed persistence
//!
//! Inventories and lists are written as JSON next to each other in the data
//! directory; settings go through confy as TOML. Inventory snapshots are
//! written behind the caller's back and handed out as a [`PendingSave`].
//! Overlapping inventory writes are serialised, and a write that was
//! overtaken by a newer snapshot skips itself.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::context::{APP_NAME, AppConfig};
use crate::error::StoreError;
use crate::filters::FilterConfiguration;
use crate::inventory::InventoryItem;
use crate::services::ConfigurationStore;

pub const INVENTORIES_FILE: &str = "inventories.json";
pub const LISTS_FILE: &str = "lists.json";

// ═══════════════════════════════════════════════════════════════════════════
// Pending saves
// ═══════════════════════════════════════════════════════════════════════════

/// A save that may still be running in the background
#[derive(Debug)]
pub enum PendingSave {
    Finished(Result<(), StoreError>),
    Running(JoinHandle<Result<(), StoreError>>),
}

/// How waiting on a [`PendingSave`] ended
#[derive(Debug)]
pub enum SaveWait {
    Completed,
    Failed(StoreError),
    TimedOut,
}

impl PendingSave {
    pub fn done() -> Self {
        PendingSave::Finished(Ok(()))
    }

    pub fn is_finished(&self) -> bool {
        match self {
            PendingSave::Finished(_) => true,
            PendingSave::Running(handle) => handle.is_finished(),
        }
    }

    /// Wait for the save, giving up after `limit`. A timed out save keeps
    /// running detached.
    pub async fn wait(self, limit: Duration) -> SaveWait {
        let result = match self {
            PendingSave::Finished(result) => result,
            PendingSave::Running(handle) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined.map_err(StoreError::from).and_then(|r| r),
                Err(_) => return SaveWait::TimedOut,
            },
        };
        match result {
            Ok(()) => SaveWait::Completed,
            Err(e) => SaveWait::Failed(e),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// JSON store
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
    config_path: PathBuf,
    /// Generation of the newest inventory snapshot handed to `save_inventories`
    inventory_generation: Arc<AtomicU64>,
    inventory_write: Arc<Mutex<()>>,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            config_path: config_path.into(),
            inventory_generation: Arc::new(AtomicU64::new(0)),
            inventory_write: Arc::new(Mutex::new(())),
        }
    }

    /// Store rooted in a single directory, settings included
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let config_path = data_dir.join(format!("{APP_NAME}.toml"));
        Self::new(data_dir, config_path)
    }

    /// Platform data directory for inventories and lists, confy's path for settings
    pub fn default_location() -> Result<Self, StoreError> {
        let config_path = AppConfig::default_path()?;
        let data_dir = dirs::data_dir()
            .map(|d| d.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::new(data_dir, config_path))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load_config(&self) -> AppConfig {
        if !self.config_path.exists() {
            return AppConfig::default();
        }
        match AppConfig::load_from(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load settings, using defaults");
                AppConfig::default()
            }
        }
    }

    /// Saved lists, or none when nothing was saved yet
    pub fn load_lists(&self) -> Result<Vec<FilterConfiguration>, StoreError> {
        read_json(&self.data_dir.join(LISTS_FILE))
    }

    pub fn load_inventories(&self) -> Result<Vec<InventoryItem>, StoreError> {
        read_json(&self.data_dir.join(INVENTORIES_FILE))
    }
}

impl ConfigurationStore for JsonStore {
    fn save_config(&self, config: &AppConfig) -> Result<(), StoreError> {
        config.save_to(&self.config_path)?;
        tracing::debug!(path = %self.config_path.display(), "Saved settings");
        Ok(())
    }

    fn save_lists(&self, lists: &[FilterConfiguration]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(lists).map_err(|source| StoreError::Serialize {
            what: "lists",
            source,
        })?;
        write_file(&self.data_dir.join(LISTS_FILE), &bytes)
    }

    fn save_inventories(&self, items: Vec<InventoryItem>) -> PendingSave {
        let path = self.data_dir.join(INVENTORIES_FILE);
        let generation = self.inventory_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.inventory_generation);
        let write_lock = Arc::clone(&self.inventory_write);
        let write = move || {
            let _guard = write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            if latest.load(Ordering::SeqCst) != generation {
                tracing::trace!(generation, "Inventory snapshot superseded, skipping write");
                return Ok(());
            }
            let bytes =
                serde_json::to_vec(&items).map_err(|source| StoreError::Serialize {
                    what: "inventories",
                    source,
                })?;
            write_file(&path, &bytes)
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => PendingSave::Running(handle.spawn_blocking(write)),
            Err(_) => PendingSave::Finished(write()),
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(io_err)?;
    // Unique temp file next to the target, then renamed over it
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&text).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
