//! Anchor history persistence: load, prune, and save the bounded collection.
//!
//! The whole collection is stored as one JSON blob under
//! [`ANCHOR_HISTORY_KEY`]:
//! ```json
//! {
//!     "version": 1,
//!     "records": [ ... AnchorRecord ... ]
//! }
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::HistoryConfig;
use crate::error::{GateError, Result};
use crate::storage::{KeyValueStore, ANCHOR_HISTORY_KEY};

use super::types::{AnchorHistoryCollection, AnchorRecord};

// ── Blob format ───────────────────────────────────────────────────────────────

const HISTORY_BLOB_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct HistoryBlob {
    /// Format version number.
    version: u32,
    records: Vec<AnchorRecord>,
}

/// Serialize a collection into its stored blob.
pub fn encode_history(collection: &AnchorHistoryCollection) -> Result<String> {
    let blob = HistoryBlob {
        version: HISTORY_BLOB_VERSION,
        records: collection.records().to_vec(),
    };
    serde_json::to_string(&blob).map_err(|e| GateError::Serialization(e.to_string()))
}

/// Parse a stored blob into records.
pub fn decode_history(blob: &str) -> Result<Vec<AnchorRecord>> {
    let blob: HistoryBlob = serde_json::from_str(blob)
        .map_err(|e| GateError::Serialization(format!("failed to parse anchor history: {e}")))?;
    if blob.version != HISTORY_BLOB_VERSION {
        return Err(GateError::Serialization(format!(
            "unsupported anchor history version {}",
            blob.version
        )));
    }
    Ok(blob.records)
}

// ── AnchorHistoryStore ────────────────────────────────────────────────────────

/// Loads, prunes, and persists the anchor history through a [`KeyValueStore`].
pub struct AnchorHistoryStore<S> {
    store: S,
    config: HistoryConfig,
}

impl<S: KeyValueStore> AnchorHistoryStore<S> {
    pub fn new(store: S, config: HistoryConfig) -> Self {
        Self { store, config }
    }

    /// Load the history as of `now`.
    ///
    /// With nothing stored this returns an empty collection and writes nothing.
    /// Otherwise expired records are removed, capacity is enforced, and the
    /// result is written back immediately.
    pub fn load(&mut self, now: NaiveDateTime) -> Result<AnchorHistoryCollection> {
        let Some(blob) = self.store.get_string(ANCHOR_HISTORY_KEY) else {
            return Ok(AnchorHistoryCollection::new(self.config.max_entries));
        };

        let records = decode_history(&blob)?;
        let collection = self.prune(
            AnchorHistoryCollection::from_records(records, self.config.max_entries),
            now,
        );
        self.save(&collection)?;
        Ok(collection)
    }

    /// Persist the collection.
    pub fn save(&mut self, collection: &AnchorHistoryCollection) -> Result<()> {
        let blob = encode_history(collection)?;
        self.store.set_string(ANCHOR_HISTORY_KEY, &blob)?;
        self.store.flush()
    }

    /// Remove every record at or beyond the configured calendar-day age.
    pub fn prune(
        &self,
        mut collection: AnchorHistoryCollection,
        now: NaiveDateTime,
    ) -> AnchorHistoryCollection {
        let removed = collection.prune(now, self.config.max_age_days);
        if !removed.is_empty() {
            log::info!("Pruned {} expired anchor record(s)", removed.len());
        }
        collection
    }

    /// Delete the stored history entirely.
    pub fn clear(&mut self) -> Result<()> {
        self.store.delete_key(ANCHOR_HISTORY_KEY)?;
        self.store.flush()
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
