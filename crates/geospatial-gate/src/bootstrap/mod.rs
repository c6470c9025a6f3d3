//! Bring-up sequencing of platform services.
//!
//! - [`BootstrapState`]: progress of one run.
//! - [`BootstrapSequencer`]: tick-driven runner of the ordered steps.

pub mod sequencer;
pub(crate) mod steps;
pub mod types;

pub use sequencer::BootstrapSequencer;
pub use types::BootstrapState;
