//! Positioning-service availability probe at the device's coordinates.

pub mod engine;
pub mod types;

pub use engine::AvailabilityProbe;
pub use types::{ProbeSignals, ProbeStatus};
