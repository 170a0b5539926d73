//! Store Module - File-backed boundary collaborators
//!
//! Structured-text persistence the core consumes through a narrow
//! load/save surface:
//!
//! - **Config** - the settings snapshot, TOML
//! - **History** - recognized utterances, JSON, newest first
//! - **Snippets** - text-expansion entries, JSON
//!
//! Failures are [`StoreError`] values recovered at the call site; a
//! missing file loads as the empty/default value rather than an error.

mod config;
mod history;
mod snippets;

pub use config::{ConfigStore, Hotkeys, Settings};
pub use history::{HistoryEntry, HistoryStore};
pub use snippets::{Snippet, SnippetStore};

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure at a file-store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    MalformedToml(#[from] toml::de::Error),
    #[error("serialize settings: {0}")]
    SerializeToml(#[from] toml::ser::Error),
    #[error("malformed entry list: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

/// Load a JSON list; a missing file is the empty list.
fn load_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Save a JSON list, creating parent directories as needed.
fn save_json_list<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(items)?;
    fs::write(path, raw)?;
    Ok(())
}
