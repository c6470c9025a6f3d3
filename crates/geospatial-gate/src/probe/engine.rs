//! Availability probe engine: gated, one-shot positioning availability query.
//!
//! Preconditions are checked in order and the probe stops at the first one
//! that is not met:
//!
//! 1. AR runtime availability check (and install when needed), each followed
//!    by a one-tick yield
//! 2. camera permission, with one settle-delayed re-check
//! 3. the location service has finished starting and is running
//! 4. the session is not returning
//! 5. a location fix exists
//!
//! Then exactly one query is issued. Once issued it cannot be aborted; a
//! later `session_returning` signal does not stop the wait for its answer.

use std::task::Poll;

use crate::bootstrap::steps::{PermissionGate, RuntimeReadiness};
use crate::config::GateConfig;
use crate::failure::SoftFailure;
use crate::ports::{
    LocationStatus, PermissionKind, Platform, PositioningAvailability, Promise, PromiseState,
};
use crate::pose::GeoCoordinates;

use super::types::{ProbeSignals, ProbeStatus};

enum ProbePhase {
    Runtime,
    Camera,
    Location,
    Query {
        coordinates: GeoCoordinates,
        promise: Box<dyn Promise<PositioningAvailability>>,
    },
    Finished,
}

/// One positioning-availability probe run.
pub struct AvailabilityProbe {
    runtime: RuntimeReadiness,
    camera: PermissionGate,
    phase: ProbePhase,
    status: ProbeStatus,
    queries_issued: u32,
}

impl AvailabilityProbe {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            runtime: RuntimeReadiness::new(config.runtime_op_timeout_micros(), true),
            camera: PermissionGate::new(PermissionKind::Camera, config.permission_settle_micros()),
            phase: ProbePhase::Runtime,
            status: ProbeStatus::Running,
            queries_issued: 0,
        }
    }

    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    /// Number of positioning queries this probe has issued (zero or one).
    pub fn queries_issued(&self) -> u32 {
        self.queries_issued
    }

    /// Advance the probe. A finished probe keeps returning its final status.
    pub fn tick<P>(&mut self, now: u64, platform: &mut P, signals: &ProbeSignals) -> ProbeStatus
    where
        P: Platform + ?Sized,
    {
        loop {
            match &mut self.phase {
                ProbePhase::Runtime => match self.runtime.poll(now, platform) {
                    Poll::Pending => return self.status,
                    Poll::Ready(Err(soft)) => return self.abort(soft),
                    Poll::Ready(Ok(())) => self.phase = ProbePhase::Camera,
                },
                ProbePhase::Camera => match self.camera.poll(now, platform) {
                    Poll::Pending => return self.status,
                    Poll::Ready(false) => {
                        return self.abort(SoftFailure::CameraPermissionDenied);
                    }
                    Poll::Ready(true) => self.phase = ProbePhase::Location,
                },
                ProbePhase::Location => {
                    if signals.location_starting {
                        log::debug!("Probe: waiting for the location service to start");
                        return self.status;
                    }
                    let status = platform.status();
                    if status != LocationStatus::Running {
                        log::warn!("Location service is not running ({status:?})");
                        return self.abort(SoftFailure::LocationNotRunning(status));
                    }
                    if signals.session_returning {
                        log::info!("Probe: session is returning, cancelling");
                        return self.finish(ProbeStatus::Cancelled);
                    }
                    let Some(coordinates) = platform.last_known_coordinates() else {
                        return self.abort(SoftFailure::CoordinatesUnavailable);
                    };
                    log::info!(
                        "Probe: querying positioning availability at ({}, {})",
                        coordinates.latitude,
                        coordinates.longitude
                    );
                    let promise =
                        platform.query_availability(coordinates.latitude, coordinates.longitude);
                    self.queries_issued += 1;
                    self.phase = ProbePhase::Query {
                        coordinates,
                        promise,
                    };
                }
                ProbePhase::Query {
                    coordinates,
                    promise,
                } => match promise.poll() {
                    PromiseState::Pending => return self.status,
                    PromiseState::Done(availability) => {
                        let coordinates = *coordinates;
                        log::info!(
                            "Availability at ({}, {}): {availability:?}",
                            coordinates.latitude,
                            coordinates.longitude
                        );
                        return self.finish(ProbeStatus::Completed {
                            coordinates,
                            availability,
                        });
                    }
                    PromiseState::Cancelled => {
                        log::info!("Probe: positioning query was cancelled");
                        return self.finish(ProbeStatus::Cancelled);
                    }
                },
                ProbePhase::Finished => return self.status,
            }
        }
    }

    fn abort(&mut self, soft: SoftFailure) -> ProbeStatus {
        log::warn!("Probe: aborted, {soft}");
        self.finish(ProbeStatus::Aborted(soft))
    }

    fn finish(&mut self, status: ProbeStatus) -> ProbeStatus {
        self.phase = ProbePhase::Finished;
        self.status = status;
        status
    }
}
