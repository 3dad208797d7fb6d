use std::path::PathBuf;

use thiserror::Error;

/// Errors from the persistence collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        source: serde_json::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("background save task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors loading or storing the application settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config from {path:?}: {source}")]
    Load {
        path: PathBuf,
        source: confy::ConfyError,
    },

    #[error("failed to store config to {path:?}: {source}")]
    Store {
        path: PathBuf,
        source: confy::ConfyError,
    },

    #[error("no config directory available on this platform")]
    NoConfigDir,
}

/// Errors from the column registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColumnError {
    #[error("column '{0}' is already registered")]
    DuplicateKey(String),
}
