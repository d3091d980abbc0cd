use std::fs;
use std::path::{Path, PathBuf};

use folio_codec::Format;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Flush strategy for record writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` the temp file before rename and the directory after it.
    EveryWrite,
    /// Rely on OS page-cache buffering; rename is still atomic.
    OsDefault,
}

impl Default for SyncMode {
    fn default() -> Self {
        Self::OsDefault
    }
}

/// What `delete` does when the target does not exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Report [`StoreError::NotFound`].
    Error,
    /// Treat the delete as already done.
    Ignore,
}

impl Default for DeletePolicy {
    fn default() -> Self {
        Self::Error
    }
}

/// Configuration for opening a store.
///
/// Can be built in code or loaded from TOML:
///
/// ```toml
/// root = "/var/lib/app/db"
/// format = "json"
/// sync = "every_write"
/// missing_on_delete = "ignore"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the root document.
    pub root: PathBuf,
    /// Record encoding for the whole tree.
    pub format: Format,
    /// Flush strategy for writes.
    pub sync: SyncMode,
    /// Behavior of `delete` on an absent path.
    pub missing_on_delete: DeletePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("folio-data"),
            format: Format::default(),
            sync: SyncMode::default(),
            missing_on_delete: DeletePolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            root: root.into(),
            format,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| StoreError::io("read config", path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }
}
