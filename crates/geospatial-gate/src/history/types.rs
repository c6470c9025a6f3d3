//! Anchor records and the bounded history collection.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::pose::{GeoCoordinates, Quaternion};
use crate::time::calendar_days_between;

// ---------------------------------------------------------------------------
// Anchor record
// ---------------------------------------------------------------------------

/// Unique identifier for a placed anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorId(pub String);

impl AnchorId {
    /// Generate a fresh random identifier (`ganc_` + base58).
    pub fn generate() -> Self {
        let bytes: [u8; 12] = rand::random();
        Self(format!("ganc_{}", bs58::encode(bytes).into_string()))
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an anchor's altitude is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorKind {
    /// Altitude given explicitly in WGS84.
    Geospatial,
    /// Altitude relative to the terrain.
    Terrain,
    /// Altitude relative to the rooftop below.
    Rooftop,
}

impl AnchorKind {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Geospatial => "geospatial",
            Self::Terrain => "terrain",
            Self::Rooftop => "rooftop",
        }
    }

    /// Parse a tag produced by [`AnchorKind::as_tag`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "geospatial" => Some(Self::Geospatial),
            "terrain" => Some(Self::Terrain),
            "rooftop" => Some(Self::Rooftop),
            _ => None,
        }
    }
}

impl Default for AnchorKind {
    fn default() -> Self {
        Self::Geospatial
    }
}

/// A previously placed anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub id: AnchorId,
    pub kind: AnchorKind,
    pub coordinates: GeoCoordinates,
    /// Orientation in the East-Up-North frame.
    pub rotation: Quaternion,
    /// Device-local creation time.
    pub created_at: NaiveDateTime,
}

impl AnchorRecord {
    /// Create a record with a fresh identifier.
    pub fn new(
        kind: AnchorKind,
        coordinates: GeoCoordinates,
        rotation: Quaternion,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: AnchorId::generate(),
            kind,
            coordinates,
            rotation,
            created_at,
        }
    }

    /// Calendar days between creation and `now`.
    pub fn age_days(&self, now: NaiveDateTime) -> i64 {
        calendar_days_between(self.created_at, now)
    }
}

// ---------------------------------------------------------------------------
// History collection
// ---------------------------------------------------------------------------

/// Ordered, capacity-bounded sequence of anchor records.
///
/// Insertion order is preserved. When full, the record with the earliest
/// creation time is evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorHistoryCollection {
    records: Vec<AnchorRecord>,
    capacity: usize,
}

impl AnchorHistoryCollection {
    /// Create an empty collection. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Build a collection from stored records, evicting oldest-first beyond capacity.
    pub fn from_records(records: Vec<AnchorRecord>, capacity: usize) -> Self {
        let mut collection = Self {
            records,
            capacity: capacity.max(1),
        };
        collection.enforce_capacity();
        collection
    }

    /// Append a record, returning any record evicted to make room.
    pub fn push(&mut self, record: AnchorRecord) -> Option<AnchorRecord> {
        let evicted = if self.records.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };
        self.records.push(record);
        evicted
    }

    pub fn remove(&mut self, id: &AnchorId) -> Option<AnchorRecord> {
        let index = self.records.iter().position(|r| &r.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Drop every record `max_age_days` or more calendar days old.
    ///
    /// Returns the removed records in their original order.
    pub fn prune(&mut self, now: NaiveDateTime, max_age_days: i64) -> Vec<AnchorRecord> {
        let (expired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| r.age_days(now) >= max_age_days);
        self.records = kept;
        expired
    }

    pub fn get(&self, id: &AnchorId) -> Option<&AnchorRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn records(&self) -> &[AnchorRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnchorRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn enforce_capacity(&mut self) {
        while self.records.len() > self.capacity {
            self.evict_oldest();
        }
    }

    fn evict_oldest(&mut self) -> Option<AnchorRecord> {
        // min_by_key keeps the first of equal keys, so ties go to insertion order.
        let index = self
            .records
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| r.created_at)
            .map(|(i, _)| i)?;
        Some(self.records.remove(index))
    }
}

impl<'a> IntoIterator for &'a AnchorHistoryCollection {
    type Item = &'a AnchorRecord;
    type IntoIter = std::slice::Iter<'a, AnchorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
