//! TOML-backed [`StateStore`].
//!
//! The whole store is one flat TOML table of string values:
//!
//! ```toml
//! speedup_gzip_compression = "on"
//! speedup_htaccess_save = "ok"
//! ```
//!
//! The file is loaded on [`TomlStateStore::open`] and again before every
//! change, so keys written by another process since then are kept.  Each
//! change is written back atomically.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::application::state::{StateStore, StoreError};

pub struct TomlStateStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl TomlStateStore {
    /// Opens the store at `path`; a missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read and
    /// [`StoreError::Corrupt`] if it is not a flat table of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = load(&path)?;
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let text = toml::to_string(values).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        super::write_atomically(&self.path, &text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), keys = values.len(), "state saved");
        Ok(())
    }

    /// Reloads the file, applies `change` and persists.  The in-memory map
    /// only moves to the new values when the write succeeded.
    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = load(&self.path)?;
        if change(&mut next) {
            self.save(&next)?;
        }
        *values = next;
        Ok(())
    }
}

/// Reads the table at `path`; a missing file is an empty table.
fn load(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(text) => toml::from_str(&text).map_err(|e| StoreError::Corrupt(e.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl StateStore for TomlStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.update(|values| values.remove(key).is_some())
    }
}
