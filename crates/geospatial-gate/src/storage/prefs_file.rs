//! Preferences file: a single JSON document of string values.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "values": { "key": "value", ... }
//! }
//! ```
//!
//! Changes are held in memory and written by [`KeyValueStore::flush`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};

use super::KeyValueStore;

// ── File format constants ─────────────────────────────────────────────────────

const PREFS_FILE_VERSION: u32 = 1;

// ── On-disk structure ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct PrefsDocument {
    /// Format version number.
    version: u32,
    values: BTreeMap<String, String>,
}

// ── PrefsFile ─────────────────────────────────────────────────────────────────

/// File-backed key-value store.
///
/// Safe for single-process use; concurrent writers are not coordinated.
#[derive(Debug)]
pub struct PrefsFile {
    path: PathBuf,
    values: BTreeMap<String, String>,
    dirty: bool,
}

impl PrefsFile {
    /// Open the preferences file at `path`.
    ///
    /// A missing file is an empty store; it is created on the first flush.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let bytes = std::fs::read(&path)?;
            let doc: PrefsDocument = serde_json::from_slice(&bytes).map_err(|e| {
                GateError::Serialization(format!(
                    "failed to parse preferences file {}: {e}",
                    path.display()
                ))
            })?;
            if doc.version != PREFS_FILE_VERSION {
                return Err(GateError::Storage(format!(
                    "unsupported preferences file version {} in {}",
                    doc.version,
                    path.display()
                )));
            }
            doc.values
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys currently present, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl KeyValueStore for PrefsFile {
    fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.dirty = true;
        Ok(())
    }

    fn delete_key(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let doc = PrefsDocument {
            version: PREFS_FILE_VERSION,
            values: self.values.clone(),
        };
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| GateError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, json.as_bytes())?;
        self.dirty = false;

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
