//! Deterministic simulated platform.
//!
//! [`SimulatedPlatform`] implements every port with scripted behavior so the
//! state machines can be driven without a device. The driver calls
//! [`SimulatedPlatform::advance`] once per frame, after ticking the state
//! machines, to let the simulated services make progress.

use std::cell::RefCell;
use std::rc::Rc;

use crate::pose::{GeoCoordinates, PoseSample};
use crate::ports::{
    ArRuntime, CapabilityConfig, EarthState, FeatureSupport, GeospatialCapability,
    GeospatialMode, LocationService, LocationStatus, PermissionKind, Permissions,
    PositioningAvailability, PositioningService, Promise, PromiseState, SessionRuntimeState,
    TrackingState,
};

/// Scripted device behavior.
#[derive(Debug, Clone)]
pub struct SimScript {
    pub location_permission: bool,
    pub camera_permission: bool,
    pub grant_location_on_request: bool,
    pub grant_camera_on_request: bool,
    pub location_enabled: bool,
    /// Frames the location service spends in `Initializing`.
    pub location_startup_ticks: u32,
    /// Status the location service settles in after starting.
    pub location_outcome: LocationStatus,
    pub coordinates: Option<GeoCoordinates>,
    pub initial_runtime_state: SessionRuntimeState,
    pub needs_install: bool,
    /// Frames a runtime availability-check or install request takes.
    pub runtime_op_ticks: u32,
    pub feature_support: FeatureSupport,
    pub initial_configuration: CapabilityConfig,
    /// Frames between enabling geospatial mode and the earth state enabling.
    pub earth_enable_ticks: u32,
    pub tracking: bool,
    pub pose: PoseSample,
    pub positioning: PositioningAvailability,
    /// Frames a positioning availability query takes.
    pub positioning_ticks: u32,
}

impl Default for SimScript {
    fn default() -> Self {
        Self {
            location_permission: true,
            camera_permission: true,
            grant_location_on_request: true,
            grant_camera_on_request: true,
            location_enabled: true,
            location_startup_ticks: 1,
            location_outcome: LocationStatus::Running,
            coordinates: Some(GeoCoordinates::new(37.4220, -122.0841, 12.0)),
            initial_runtime_state: SessionRuntimeState::None,
            needs_install: false,
            runtime_op_ticks: 1,
            feature_support: FeatureSupport::Supported,
            initial_configuration: CapabilityConfig::DISABLED,
            earth_enable_ticks: 1,
            tracking: true,
            pose: PoseSample::with_accuracy(3.0, 2.0, 1.0),
            positioning: PositioningAvailability::Available,
            positioning_ticks: 1,
        }
    }
}

/// Requests the simulated platform has received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimCounters {
    pub location_permission_requests: u32,
    pub camera_permission_requests: u32,
    pub location_starts: u32,
    pub location_stops: u32,
    pub availability_checks: u32,
    pub installs: u32,
    pub configure_calls: u32,
    pub positioning_queries: u32,
}

impl SimCounters {
    pub fn permission_requests(&self, kind: PermissionKind) -> u32 {
        match kind {
            PermissionKind::FineLocation => self.location_permission_requests,
            PermissionKind::Camera => self.camera_permission_requests,
        }
    }
}

type Slot<T> = Rc<RefCell<PromiseState<T>>>;

/// Promise backed by a slot the platform fills in on `advance`.
struct SharedPromise<T> {
    slot: Slot<T>,
}

impl<T: Clone> Promise<T> for SharedPromise<T> {
    fn poll(&mut self) -> PromiseState<T> {
        self.slot.borrow().clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuntimeOp {
    AvailabilityCheck,
    Install,
}

struct PendingRuntimeOp {
    op: RuntimeOp,
    remaining: u32,
    slot: Slot<()>,
}

struct PendingQuery {
    remaining: u32,
    slot: Slot<PositioningAvailability>,
}

/// In-process platform with scripted services.
pub struct SimulatedPlatform {
    script: SimScript,
    location_permission: bool,
    camera_permission: bool,
    location_status: LocationStatus,
    location_countdown: u32,
    runtime_state: SessionRuntimeState,
    runtime_op: Option<PendingRuntimeOp>,
    configuration: CapabilityConfig,
    earth_state: EarthState,
    earth_countdown: Option<u32>,
    tracking: bool,
    pose: PoseSample,
    queries: Vec<PendingQuery>,
    counters: SimCounters,
}

impl SimulatedPlatform {
    pub fn new(script: SimScript) -> Self {
        let earth_state = if script.initial_configuration.geospatial == GeospatialMode::Enabled {
            EarthState::Enabled
        } else {
            EarthState::ErrorGeospatialModeDisabled
        };
        Self {
            location_permission: script.location_permission,
            camera_permission: script.camera_permission,
            location_status: if script.location_enabled {
                LocationStatus::Stopped
            } else {
                LocationStatus::Disabled
            },
            location_countdown: 0,
            runtime_state: script.initial_runtime_state,
            runtime_op: None,
            configuration: script.initial_configuration,
            earth_state,
            earth_countdown: None,
            tracking: script.tracking,
            pose: script.pose,
            queries: Vec::new(),
            counters: SimCounters::default(),
            script,
        }
    }

    /// Let every simulated service make one frame of progress.
    pub fn advance(&mut self) {
        if self.location_status == LocationStatus::Initializing {
            self.location_countdown = self.location_countdown.saturating_sub(1);
            if self.location_countdown == 0 {
                self.location_status = self.script.location_outcome;
            }
        }

        match self.runtime_op.take() {
            Some(mut pending) => {
                pending.remaining = pending.remaining.saturating_sub(1);
                if pending.remaining == 0 {
                    self.complete_runtime_op(pending);
                } else {
                    self.runtime_op = Some(pending);
                }
            }
            None => {
                self.runtime_state = match self.runtime_state {
                    SessionRuntimeState::Ready => SessionRuntimeState::SessionInitializing,
                    SessionRuntimeState::SessionInitializing => {
                        SessionRuntimeState::SessionTracking
                    }
                    other => other,
                };
            }
        }

        if let Some(remaining) = self.earth_countdown {
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                self.earth_state = EarthState::Enabled;
                self.earth_countdown = None;
            } else {
                self.earth_countdown = Some(remaining);
            }
        }

        let answer = self.script.positioning;
        self.queries.retain_mut(|query| {
            query.remaining = query.remaining.saturating_sub(1);
            if query.remaining == 0 {
                *query.slot.borrow_mut() = PromiseState::Done(answer);
                return false;
            }
            true
        });
    }

    pub fn counters(&self) -> &SimCounters {
        &self.counters
    }

    pub fn set_tracking(&mut self, tracking: bool) {
        self.tracking = tracking;
    }

    pub fn set_pose(&mut self, pose: PoseSample) {
        self.pose = pose;
    }

    pub fn set_runtime_state(&mut self, state: SessionRuntimeState) {
        self.runtime_state = state;
    }

    pub fn set_location_status(&mut self, status: LocationStatus) {
        self.location_status = status;
    }

    fn complete_runtime_op(&mut self, pending: PendingRuntimeOp) {
        self.runtime_state = match pending.op {
            RuntimeOp::AvailabilityCheck if self.script.needs_install => {
                SessionRuntimeState::NeedsInstall
            }
            RuntimeOp::AvailabilityCheck | RuntimeOp::Install => SessionRuntimeState::Ready,
        };
        *pending.slot.borrow_mut() = PromiseState::Done(());
    }

    fn begin_runtime_op(&mut self, op: RuntimeOp) -> Box<dyn Promise<()>> {
        let slot: Slot<()> = Rc::new(RefCell::new(PromiseState::Pending));
        let pending = PendingRuntimeOp {
            op,
            remaining: self.script.runtime_op_ticks,
            slot: Rc::clone(&slot),
        };
        if pending.remaining == 0 {
            self.complete_runtime_op(pending);
        } else {
            self.runtime_op = Some(pending);
        }
        Box::new(SharedPromise { slot })
    }
}

impl Permissions for SimulatedPlatform {
    fn has_permission(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::FineLocation => self.location_permission,
            PermissionKind::Camera => self.camera_permission,
        }
    }

    fn request_permission(&mut self, kind: PermissionKind) {
        match kind {
            PermissionKind::FineLocation => {
                self.counters.location_permission_requests += 1;
                if self.script.grant_location_on_request {
                    self.location_permission = true;
                }
            }
            PermissionKind::Camera => {
                self.counters.camera_permission_requests += 1;
                if self.script.grant_camera_on_request {
                    self.camera_permission = true;
                }
            }
        }
    }
}

impl LocationService for SimulatedPlatform {
    fn status(&self) -> LocationStatus {
        self.location_status
    }

    fn start(&mut self) {
        self.counters.location_starts += 1;
        if self.location_status == LocationStatus::Disabled {
            return;
        }
        if self.script.location_startup_ticks == 0 {
            self.location_status = self.script.location_outcome;
        } else {
            self.location_status = LocationStatus::Initializing;
            self.location_countdown = self.script.location_startup_ticks;
        }
    }

    fn stop(&mut self) {
        self.counters.location_stops += 1;
        if self.location_status != LocationStatus::Disabled {
            self.location_status = LocationStatus::Stopped;
        }
    }

    fn last_known_coordinates(&self) -> Option<GeoCoordinates> {
        if self.location_status == LocationStatus::Running {
            self.script.coordinates
        } else {
            None
        }
    }
}

impl ArRuntime for SimulatedPlatform {
    fn runtime_state(&self) -> SessionRuntimeState {
        self.runtime_state
    }

    fn request_availability_check(&mut self) -> Box<dyn Promise<()>> {
        self.counters.availability_checks += 1;
        self.runtime_state = SessionRuntimeState::CheckingAvailability;
        self.begin_runtime_op(RuntimeOp::AvailabilityCheck)
    }

    fn request_install(&mut self) -> Box<dyn Promise<()>> {
        self.counters.installs += 1;
        self.runtime_state = SessionRuntimeState::Installing;
        self.begin_runtime_op(RuntimeOp::Install)
    }
}

impl GeospatialCapability for SimulatedPlatform {
    fn is_supported(&self, mode: GeospatialMode) -> FeatureSupport {
        match mode {
            GeospatialMode::Disabled => FeatureSupport::Supported,
            GeospatialMode::Enabled => self.script.feature_support,
        }
    }

    fn configuration(&self) -> CapabilityConfig {
        self.configuration
    }

    fn configure(&mut self, config: CapabilityConfig) {
        self.counters.configure_calls += 1;
        self.configuration = config;
        if config.geospatial == GeospatialMode::Disabled {
            self.earth_state = EarthState::ErrorGeospatialModeDisabled;
            self.earth_countdown = None;
        } else if self.earth_state != EarthState::Enabled {
            if self.script.earth_enable_ticks == 0 {
                self.earth_state = EarthState::Enabled;
            } else {
                self.earth_countdown = Some(self.script.earth_enable_ticks);
            }
        }
    }

    fn earth_state(&self) -> EarthState {
        self.earth_state
    }

    fn tracking_state(&self) -> TrackingState {
        if self.tracking
            && self.runtime_state == SessionRuntimeState::SessionTracking
            && self.earth_state == EarthState::Enabled
        {
            TrackingState::Tracking
        } else {
            TrackingState::NotTracking
        }
    }

    fn camera_pose(&self) -> PoseSample {
        self.pose
    }
}

impl PositioningService for SimulatedPlatform {
    fn query_availability(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Box<dyn Promise<PositioningAvailability>> {
        self.counters.positioning_queries += 1;
        log::debug!("Simulated positioning query at ({latitude}, {longitude})");
        let slot: Slot<PositioningAvailability> = Rc::new(RefCell::new(PromiseState::Pending));
        if self.script.positioning_ticks == 0 {
            *slot.borrow_mut() = PromiseState::Done(self.script.positioning);
        } else {
            self.queries.push(PendingQuery {
                remaining: self.script.positioning_ticks,
                slot: Rc::clone(&slot),
            });
        }
        Box::new(SharedPromise { slot })
    }
}
