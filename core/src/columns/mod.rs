//! Display columns for lists
//!
//! This module provides:
//! - **Column behaviors**: what a column shows and where it is allowed ([`Column`])
//! - **Column configurations**: one user-customised use of a column inside a
//!   list, with optional custom display/export names ([`ColumnConfiguration`])
//! - **Registry**: every known behavior, keyed by a stable string key
//!
//! A list holds an ordered `Vec<ColumnConfiguration>`. The same column may
//! appear more than once (e.g. shown twice with different export names), so
//! configurations are identified by instance, not by key.

mod builtin;
mod registry;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tally_types::{ColumnCategory, FilterType};

pub use builtin::{BuiltinColumn, builtin_columns};
pub use registry::{ColumnGroup, ColumnRegistry, parseable};

/// Behavior of a column that can be added to a list
pub trait Column: Send + Sync + fmt::Debug {
    /// Stable key used to find the column again after a reload
    fn key(&self) -> &str;

    /// Default display name
    fn name(&self) -> &str;

    fn help_text(&self) -> &str;

    fn category(&self) -> ColumnCategory;

    /// Columns that only make sense inside the craft table are never offered
    /// in the generic column picker.
    fn craft_only(&self) -> bool {
        false
    }

    fn available_in_type(&self, filter_type: FilterType) -> bool;

    /// Whether the column is part of the default set for a list type
    fn default_in(&self, filter_type: FilterType) -> bool {
        let _ = filter_type;
        false
    }

    fn is_configurable(&self) -> bool {
        false
    }
}

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

fn next_instance() -> u64 {
    NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed)
}

/// One column inside one list.
///
/// Equality is instance identity: two configurations with the same key are
/// still different entries. Clones keep the identity of their source.
#[derive(Clone, Serialize, Deserialize)]
pub struct ColumnConfiguration {
    #[serde(skip, default = "next_instance")]
    instance: u64,
    pub key: String,
    /// Custom display name (None = column default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Custom export name (None = display name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_name: Option<String>,
    #[serde(skip)]
    column: Option<Arc<dyn Column>>,
}

impl ColumnConfiguration {
    /// An unbound configuration; bind it through the registry before display
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            instance: next_instance(),
            key: key.into(),
            name: None,
            export_name: None,
            column: None,
        }
    }

    pub fn for_column(column: Arc<dyn Column>) -> Self {
        let mut config = Self::new(column.key());
        config.column = Some(column);
        config
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn column(&self) -> Option<&Arc<dyn Column>> {
        self.column.as_ref()
    }

    pub fn bind(&mut self, column: Arc<dyn Column>) {
        self.column = Some(column);
    }

    pub fn is_bound(&self) -> bool {
        self.column.is_some()
    }

    /// Custom name if set, otherwise the column's default name
    pub fn display_name(&self) -> &str {
        if let Some(name) = &self.name {
            return name;
        }
        self.column
            .as_ref()
            .map(|c| c.name())
            .unwrap_or(self.key.as_str())
    }

    /// Name used when exporting the list
    pub fn export_name(&self) -> &str {
        self.export_name
            .as_deref()
            .unwrap_or_else(|| self.display_name())
    }

    pub fn help_text(&self) -> Option<&str> {
        self.column.as_ref().map(|c| c.help_text())
    }

    /// Set custom names. Empty strings clear back to the defaults.
    pub fn set_names(&mut self, name: &str, export_name: &str) {
        self.name = (!name.is_empty()).then(|| name.to_string());
        self.export_name = (!export_name.is_empty()).then(|| export_name.to_string());
    }
}

impl PartialEq for ColumnConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.instance == other.instance
    }
}

impl Eq for ColumnConfiguration {}

impl fmt::Debug for ColumnConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnConfiguration")
            .field("instance", &self.instance)
            .field("key", &self.key)
            .field("name", &self.name)
            .field("export_name", &self.export_name)
            .field("bound", &self.column.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_column() -> Arc<dyn Column> {
        builtin_columns()
            .into_iter()
            .find(|c| c.key() == "NameColumn")
            .unwrap()
    }

    #[test]
    fn test_display_name_falls_back_to_column() {
        let mut config = ColumnConfiguration::for_column(name_column());
        assert_eq!(config.display_name(), "Name");
        assert_eq!(config.export_name(), "Name");

        config.set_names("Item", "");
        assert_eq!(config.display_name(), "Item");
        assert_eq!(config.export_name(), "Item");
        assert!(config.export_name.is_none());

        config.set_names("", "item_name");
        assert_eq!(config.display_name(), "Name");
        assert_eq!(config.export_name(), "item_name");
    }

    #[test]
    fn test_unbound_uses_key() {
        let config = ColumnConfiguration::new("RetiredColumn");
        assert_eq!(config.display_name(), "RetiredColumn");
        assert!(config.help_text().is_none());
    }

    #[test]
    fn test_identity_is_per_instance() {
        let a = ColumnConfiguration::for_column(name_column());
        let b = ColumnConfiguration::for_column(name_column());
        assert_eq!(a.key, b.key);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_deserialized_configs_get_fresh_instances() {
        let json = r#"[{"key":"NameColumn"},{"key":"NameColumn","export_name":"n"}]"#;
        let configs: Vec<ColumnConfiguration> = serde_json::from_str(json).unwrap();
        assert_ne!(configs[0], configs[1]);
        assert!(!configs[0].is_bound());
        assert_eq!(configs[1].export_name.as_deref(), Some("n"));
    }
}
