pub mod columns;
pub mod context;
pub mod crafting;
pub mod engine;
pub mod error;
pub mod filters;
pub mod inventory;
pub mod lists;
pub mod service;
pub mod services;
pub mod state;
pub mod store;

// Re-exports for convenience
pub use columns::{Column, ColumnConfiguration, ColumnRegistry};
pub use context::AppConfig;
pub use crafting::{CraftList, ItemKey};
pub use engine::{
    IgnoreReason, InventorySignal, Reconciler, Reconciliation, ShutdownReport, SignalOutcome,
    StartupReport, TrackerSource,
};
pub use error::{ColumnError, ConfigError, StoreError};
pub use filters::FilterConfiguration;
pub use lists::ListService;
pub use service::{ReconcilerService, ServiceHandle};
pub use services::Services;
pub use store::{JsonStore, PendingSave, SaveWait};
pub use tally_types::*;
