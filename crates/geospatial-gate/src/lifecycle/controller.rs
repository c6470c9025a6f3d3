//! Lifecycle controller: bring-up, then continuous localization gating.
//!
//! Transitions (one evaluation per tick):
//!
//! ```text
//! Initializing --bootstrap Complete--> Localizing --gate true--> Loading
//!      |                                   ^                        |
//!      +--bootstrap Error--> Error         +----gate false---- Ready <+
//! ```
//!
//! The gate is re-evaluated with the same threshold in `Localizing` and
//! `Ready`, with no debounce: a single tick decides each transition.

use crate::accuracy::is_localized;
use crate::bootstrap::{BootstrapSequencer, BootstrapState};
use crate::config::GateConfig;
use crate::pose::PoseSample;
use crate::ports::{ArRuntime, GeospatialCapability, LocationService, Permissions, TrackingState};

use super::types::{LifecycleState, TickReport, UiEffect};

/// Owns the bootstrap run and the current lifecycle state.
pub struct LifecycleController {
    state: LifecycleState,
    sequencer: BootstrapSequencer,
    threshold: f64,
    pose: PoseSample,
    tracking: bool,
}

impl LifecycleController {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            state: LifecycleState::Initializing,
            sequencer: BootstrapSequencer::new(config),
            threshold: config.accuracy_threshold,
            pose: PoseSample::NOT_TRACKING,
            tracking: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Pose sampled on the most recent gate evaluation.
    pub fn pose(&self) -> PoseSample {
        self.pose
    }

    /// Tracking flag sampled on the most recent gate evaluation.
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn bootstrap(&self) -> &BootstrapSequencer {
        &self.sequencer
    }

    /// Evaluate the current state once.
    pub fn tick<P>(&mut self, now: u64, platform: &mut P) -> TickReport
    where
        P: Permissions + LocationService + ArRuntime + GeospatialCapability + ?Sized,
    {
        let previous = self.state;
        let mut effects = Vec::new();

        match self.state {
            LifecycleState::Initializing => {
                if self.sequencer.state() == BootstrapState::NotStarted {
                    log::info!("Lifecycle: starting services in background");
                    self.sequencer.start();
                    effects.push(UiEffect::SwitchToArView(true));
                }
                match self.sequencer.tick(now, platform) {
                    BootstrapState::Complete => self.set_state(LifecycleState::Localizing),
                    BootstrapState::Error => self.set_state(LifecycleState::Error),
                    _ => {}
                }
            }
            LifecycleState::Localizing => {
                if self.sample(platform) {
                    self.set_state(LifecycleState::Loading);
                }
            }
            LifecycleState::Loading => self.set_state(LifecycleState::Ready),
            LifecycleState::Ready => {
                if !self.sample(platform) {
                    self.set_state(LifecycleState::Localizing);
                }
            }
            LifecycleState::Error => log::error!("Lifecycle: state ERROR"),
        }

        TickReport {
            previous,
            current: self.state,
            effects,
        }
    }

    /// Refresh the pose and tracking flag, then evaluate the accuracy gate.
    fn sample<P>(&mut self, platform: &P) -> bool
    where
        P: GeospatialCapability + ?Sized,
    {
        self.tracking = platform.tracking_state() == TrackingState::Tracking;
        self.pose = if self.tracking {
            platform.camera_pose()
        } else {
            PoseSample::NOT_TRACKING
        };
        is_localized(&self.pose, self.tracking, self.threshold)
    }

    fn set_state(&mut self, next: LifecycleState) {
        log::info!("Lifecycle: transitioning to {next:?}");
        self.state = next;
    }
}
