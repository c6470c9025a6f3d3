//! Geospatial gate: bring-up and localization gating for geospatial AR.
//!
//! Sequences the platform services a geospatial AR session depends on,
//! gates the experience on pose accuracy, keeps a bounded history of placed
//! anchors, and probes positioning-service availability at the device's
//! location. Everything is driven by an external per-frame tick; platform
//! services are reached through the traits in [`ports`].

pub mod accuracy;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod failure;
pub mod history;
pub mod lifecycle;
pub mod ports;
pub mod pose;
pub mod probe;
pub mod session;
pub mod sim;
pub mod storage;
pub mod time;

// Re-export primary types
pub use accuracy::is_localized;
pub use config::{GateConfig, HistoryConfig, DEFAULT_ACCURACY_THRESHOLD};
pub use error::{GateError, Result};
pub use failure::{HardFailure, SoftFailure};
pub use pose::{GeoCoordinates, PoseSample, Quaternion};

// Re-export state machines
pub use bootstrap::{BootstrapSequencer, BootstrapState};
pub use lifecycle::{LifecycleController, LifecycleState, TickReport, UiEffect};
pub use probe::{AvailabilityProbe, ProbeSignals, ProbeStatus};

// Re-export history and persistence
pub use history::{
    AnchorHistoryCollection, AnchorHistoryStore, AnchorId, AnchorKind, AnchorRecord,
};
pub use session::GeospatialSession;
pub use storage::{KeyValueStore, MemoryStore, PrefsFile};
