//! Failure taxonomy for bring-up and probing.
//!
//! A [`HardFailure`] ends a bootstrap run in its terminal Error state.
//! A [`SoftFailure`] disables one feature or probe and lets the surrounding
//! flow continue with degraded functionality.

use serde::{Deserialize, Serialize};

use crate::ports::LocationStatus;

/// A precondition miss that aborts only the current step or probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoftFailure {
    /// The location service is disabled by the user, by policy, or the
    /// location permission was not granted.
    LocationDisabled,
    /// The location service settled in a non-running status and was stopped.
    LocationNotRunning(LocationStatus),
    /// The location service never left `Initializing` within its bound.
    LocationStartTimedOut,
    CameraPermissionDenied,
    /// A runtime capability-check or install request did not complete in time.
    RuntimeRequestTimedOut,
    /// The location service is running but has no fix yet.
    CoordinatesUnavailable,
}

/// An unrecoverable condition that terminates a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardFailure {
    GeospatialUnsupported,
}

impl std::fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocationDisabled => write!(f, "location service is disabled"),
            Self::LocationNotRunning(status) => {
                write!(f, "location service ended with {status:?} status")
            }
            Self::LocationStartTimedOut => write!(f, "location service did not finish starting"),
            Self::CameraPermissionDenied => write!(f, "camera permission denied"),
            Self::RuntimeRequestTimedOut => write!(f, "AR runtime request timed out"),
            Self::CoordinatesUnavailable => write!(f, "no location fix available"),
        }
    }
}

impl std::fmt::Display for HardFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GeospatialUnsupported => write!(f, "geospatial mode is unsupported"),
        }
    }
}
