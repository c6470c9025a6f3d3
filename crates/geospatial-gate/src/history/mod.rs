//! History of previously placed anchors.
//!
//! - [`AnchorRecord`] / [`AnchorHistoryCollection`]: in-memory records,
//!   bounded and evicted oldest-first.
//! - [`AnchorHistoryStore`]: load with calendar-day pruning and eager
//!   write-back, save, clear.

pub mod store;
pub mod types;

pub use store::{decode_history, encode_history, AnchorHistoryStore};
pub use types::{AnchorHistoryCollection, AnchorId, AnchorKind, AnchorRecord};
