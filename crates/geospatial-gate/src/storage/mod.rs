//! Key-value persistence port and its implementations.
//!
//! Values are opaque strings. Two logical keys are used by the library:
//!
//! - [`ANCHOR_HISTORY_KEY`]: the serialized anchor history collection.
//! - [`PRIVACY_PROMPT_KEY`]: presence-only flag: the privacy prompt has been shown.
//!
//! # Modules
//!
//! - [`memory`]: in-process map, used by tests and short-lived hosts.
//! - [`prefs_file`]: a single JSON file of string values.

pub mod memory;
pub mod prefs_file;

pub use memory::MemoryStore;
pub use prefs_file::PrefsFile;

use crate::error::Result;

/// Key holding the serialized anchor history.
pub const ANCHOR_HISTORY_KEY: &str = "PersistentGeospatialAnchors";

/// Key whose presence records that the privacy prompt was displayed.
pub const PRIVACY_PROMPT_KEY: &str = "HasDisplayedGeospatialPrivacyPrompt";

/// String key-value store.
///
/// Writes may be buffered until [`KeyValueStore::flush`].
pub trait KeyValueStore {
    fn has_key(&self, key: &str) -> bool;
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&mut self, key: &str, value: &str) -> Result<()>;
    fn delete_key(&mut self, key: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

/// Whether the one-time privacy prompt has been displayed.
pub fn has_displayed_privacy_prompt<S: KeyValueStore + ?Sized>(store: &S) -> bool {
    store.has_key(PRIVACY_PROMPT_KEY)
}

/// Record that the privacy prompt has been displayed.
pub fn mark_privacy_prompt_displayed<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<()> {
    store.set_string(PRIVACY_PROMPT_KEY, "1")?;
    store.flush()
}

/// Forget that the privacy prompt was displayed, so it shows again.
pub fn reset_privacy_prompt<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<()> {
    store.delete_key(PRIVACY_PROMPT_KEY)?;
    store.flush()
}
