//! Bootstrap state.

use serde::{Deserialize, Serialize};

/// Progress of one bring-up run.
///
/// Advances monotonically through the steps; `Complete` and `Error` are
/// terminal for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BootstrapState {
    NotStarted,
    StartLocationService,
    StartAvailabilityCheck,
    StartFeatureSupportCheck,
    Complete,
    Error,
}

impl BootstrapState {
    /// True once the run has ended, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, BootstrapState::Complete | BootstrapState::Error)
    }

    /// Stable string tag for logs and host bindings.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::StartLocationService => "start_location_service",
            Self::StartAvailabilityCheck => "start_availability_check",
            Self::StartFeatureSupportCheck => "start_feature_support_check",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl Default for BootstrapState {
    fn default() -> Self {
        Self::NotStarted
    }
}
