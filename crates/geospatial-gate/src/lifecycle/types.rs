//! Lifecycle state and per-tick reports.

use serde::{Deserialize, Serialize};

/// Top-level application state driving which UI surface is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Initializing,
    Localizing,
    /// Reserved for asset preparation; passes straight through to `Ready`.
    Loading,
    Ready,
    Error,
}

impl LifecycleState {
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Localizing => "localizing",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

/// UI-surface changes requested by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEffect {
    /// Show the AR view (and hide the privacy prompt) when `true`.
    SwitchToArView(bool),
}

/// What one controller tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub previous: LifecycleState,
    pub current: LifecycleState,
    pub effects: Vec<UiEffect>,
}

impl TickReport {
    pub fn transitioned(&self) -> bool {
        self.previous != self.current
    }
}
