//! History Store - Recognized utterances, newest first

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{StoreError, load_json_list, save_json_list};

/// One recognized utterance. `recorded_at` is an RFC 3339 timestamp
/// stamped by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    pub recorded_at: String,
}

/// JSON-backed history store. Order is preserved verbatim; callers keep
/// the list newest first.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform data location: `<data dir>/murmur/history.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("murmur").join("history.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries. A missing file is the empty list.
    pub fn load(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        load_json_list(&self.path)
    }

    pub fn save(&self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        save_json_list(&self.path, entries)
    }
}
