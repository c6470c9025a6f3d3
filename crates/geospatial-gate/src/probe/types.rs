//! Availability probe types.

use serde::{Deserialize, Serialize};

use crate::failure::SoftFailure;
use crate::ports::PositioningAvailability;
use crate::pose::GeoCoordinates;

/// Externally owned flags the probe observes at its yield points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSignals {
    /// The location service is still being brought up elsewhere.
    pub location_starting: bool,
    /// The session is returning or backgrounding; pending work should stop.
    pub session_returning: bool,
}

/// Where a probe run stands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProbeStatus {
    /// Still waiting on a precondition or the query.
    Running,
    /// The query answered.
    Completed {
        coordinates: GeoCoordinates,
        availability: PositioningAvailability,
    },
    /// A precondition was not met; no further work is done.
    Aborted(SoftFailure),
    /// The session went away, or the query was cancelled by the platform.
    Cancelled,
}

impl ProbeStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, ProbeStatus::Running)
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed { .. } => "completed",
            Self::Aborted(_) => "aborted",
            Self::Cancelled => "cancelled",
        }
    }
}
