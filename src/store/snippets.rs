//! Snippet Store - Text-expansion entries

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{StoreError, load_json_list, save_json_list};

/// A text-expansion snippet: speaking the trigger inserts the expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub trigger: String,
    pub expansion: String,
}

/// JSON-backed snippet store.
pub struct SnippetStore {
    path: PathBuf,
}

impl SnippetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform data location: `<data dir>/murmur/snippets.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("murmur").join("snippets.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all snippets. A missing file is the empty list.
    pub fn load(&self) -> Result<Vec<Snippet>, StoreError> {
        load_json_list(&self.path)
    }

    pub fn save(&self, snippets: &[Snippet]) -> Result<(), StoreError> {
        save_json_list(&self.path, snippets)
    }
}
