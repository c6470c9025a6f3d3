//! Bootstrap sequencer: ordered bring-up of platform services.
//!
//! Steps run in a fixed order:
//! 1. location service
//! 2. AR runtime availability/install and camera permission
//! 3. geospatial feature negotiation
//!
//! When a step finishes the next one starts within the same tick. Soft
//! failures are recorded and the sequence continues; a hard failure moves the
//! run to the terminal `Error` state and the remaining steps never execute.

use std::task::Poll;

use crate::config::GateConfig;
use crate::failure::{HardFailure, SoftFailure};
use crate::ports::{ArRuntime, GeospatialCapability, LocationService, Permissions};

use super::steps::{FeatureSupportCheck, LocationStartup, SessionAvailability};
use super::types::BootstrapState;

/// Drives one bring-up run from `NotStarted` to `Complete` or `Error`.
pub struct BootstrapSequencer {
    config: GateConfig,
    state: BootstrapState,
    location: LocationStartup,
    session: SessionAvailability,
    feature: FeatureSupportCheck,
    soft_failures: Vec<SoftFailure>,
    hard_failure: Option<HardFailure>,
}

impl BootstrapSequencer {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            config: config.clone(),
            state: BootstrapState::NotStarted,
            location: LocationStartup::new(
                config.permission_settle_micros(),
                config.location_start_timeout_micros(),
            ),
            session: SessionAvailability::new(
                config.permission_settle_micros(),
                config.runtime_op_timeout_micros(),
            ),
            feature: FeatureSupportCheck::new(
                config.capability_settle_micros(),
                config.feature_poll_interval_micros(),
            ),
            soft_failures: Vec::new(),
            hard_failure: None,
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Begin the run. Returns `false` if it was already started.
    pub fn start(&mut self) -> bool {
        if self.state != BootstrapState::NotStarted {
            return false;
        }
        log::info!("Bootstrap: starting initialization");
        self.enter(BootstrapState::StartLocationService);
        true
    }

    /// Put the sequencer back to `NotStarted` with fresh steps.
    ///
    /// The sequencer never restarts on its own; this is the caller's decision.
    pub fn reset(&mut self) {
        *self = Self::new(&self.config);
    }

    /// True while the location step is still bringing the service up.
    pub fn is_waiting_for_location(&self) -> bool {
        self.state == BootstrapState::StartLocationService && self.location.in_progress()
    }

    /// Soft failures recorded so far in this run, in order.
    pub fn soft_failures(&self) -> &[SoftFailure] {
        &self.soft_failures
    }

    /// The failure that ended the run, if it ended in `Error`.
    pub fn hard_failure(&self) -> Option<HardFailure> {
        self.hard_failure
    }

    /// Advance the current step. Does nothing before `start` or after the run ends.
    pub fn tick<P>(&mut self, now: u64, platform: &mut P) -> BootstrapState
    where
        P: Permissions + LocationService + ArRuntime + GeospatialCapability + ?Sized,
    {
        loop {
            match self.state {
                BootstrapState::NotStarted | BootstrapState::Complete | BootstrapState::Error => {
                    return self.state;
                }
                BootstrapState::StartLocationService => {
                    match self.location.poll(now, platform) {
                        Poll::Pending => return self.state,
                        Poll::Ready(outcome) => {
                            if let Err(soft) = outcome {
                                self.record_soft(soft);
                            }
                            self.enter(BootstrapState::StartAvailabilityCheck);
                        }
                    }
                }
                BootstrapState::StartAvailabilityCheck => {
                    match self.session.poll(now, platform) {
                        Poll::Pending => return self.state,
                        Poll::Ready(failures) => {
                            for soft in failures {
                                self.record_soft(soft);
                            }
                            self.enter(BootstrapState::StartFeatureSupportCheck);
                        }
                    }
                }
                BootstrapState::StartFeatureSupportCheck => {
                    match self.feature.poll(now, platform) {
                        Poll::Pending => return self.state,
                        Poll::Ready(Ok(())) => {
                            log::info!("Bootstrap: initialization finished");
                            self.enter(BootstrapState::Complete);
                        }
                        Poll::Ready(Err(hard)) => {
                            log::error!("Bootstrap: {hard}");
                            self.hard_failure = Some(hard);
                            self.enter(BootstrapState::Error);
                        }
                    }
                }
            }
        }
    }

    fn record_soft(&mut self, soft: SoftFailure) {
        log::warn!("Bootstrap: continuing without {soft:?} ({soft})");
        self.soft_failures.push(soft);
    }

    fn enter(&mut self, next: BootstrapState) {
        log::info!("Bootstrap: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
