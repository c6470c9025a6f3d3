//! Resumable bring-up steps.
//!
//! Each step is a small state machine polled once per tick. A step that has
//! to wait records a deadline against tick time and returns `Poll::Pending`;
//! it never blocks the caller. The same steps are reused by the
//! availability probe.

use std::task::Poll;

use crate::failure::{HardFailure, SoftFailure};
use crate::ports::{
    ArRuntime, CapabilityConfig, EarthState, FeatureSupport, GeospatialCapability,
    GeospatialMode, LocationService, LocationStatus, PermissionKind, Permissions, Promise,
    PromiseState, SessionRuntimeState,
};

fn deadline_passed(now: u64, deadline: Option<u64>) -> bool {
    deadline.is_some_and(|d| now >= d)
}

// ---------------------------------------------------------------------------
// Permission gate
// ---------------------------------------------------------------------------

enum PermissionPhase {
    Check,
    Settling { deadline: u64 },
    Finished(bool),
}

/// Request a permission if absent, wait a fixed settle delay, re-check once.
pub(crate) struct PermissionGate {
    kind: PermissionKind,
    settle: u64,
    phase: PermissionPhase,
}

impl PermissionGate {
    pub(crate) fn new(kind: PermissionKind, settle: u64) -> Self {
        Self {
            kind,
            settle,
            phase: PermissionPhase::Check,
        }
    }

    /// Resolves to whether the permission is granted.
    pub(crate) fn poll<P>(&mut self, now: u64, platform: &mut P) -> Poll<bool>
    where
        P: Permissions + ?Sized,
    {
        match self.phase {
            PermissionPhase::Check => {
                if platform.has_permission(self.kind) {
                    self.phase = PermissionPhase::Finished(true);
                    return Poll::Ready(true);
                }
                log::info!("Requesting {:?} permission", self.kind);
                platform.request_permission(self.kind);
                self.phase = PermissionPhase::Settling {
                    deadline: now.saturating_add(self.settle),
                };
                Poll::Pending
            }
            PermissionPhase::Settling { deadline } => {
                if now < deadline {
                    return Poll::Pending;
                }
                let granted = platform.has_permission(self.kind);
                self.phase = PermissionPhase::Finished(granted);
                Poll::Ready(granted)
            }
            PermissionPhase::Finished(granted) => Poll::Ready(granted),
        }
    }
}

// ---------------------------------------------------------------------------
// Location service startup
// ---------------------------------------------------------------------------

enum LocationPhase {
    Permission,
    Starting { deadline: Option<u64> },
    Finished(Result<(), SoftFailure>),
}

/// Bring the location service up, or conclude that it cannot run.
///
/// Every outcome other than `Running` is a soft failure.
pub(crate) struct LocationStartup {
    permission: PermissionGate,
    start_timeout: Option<u64>,
    phase: LocationPhase,
}

impl LocationStartup {
    pub(crate) fn new(settle: u64, start_timeout: Option<u64>) -> Self {
        Self {
            permission: PermissionGate::new(PermissionKind::FineLocation, settle),
            start_timeout,
            phase: LocationPhase::Permission,
        }
    }

    pub(crate) fn poll<P>(&mut self, now: u64, platform: &mut P) -> Poll<Result<(), SoftFailure>>
    where
        P: Permissions + LocationService + ?Sized,
    {
        loop {
            match self.phase {
                LocationPhase::Permission => {
                    let granted = match self.permission.poll(now, platform) {
                        Poll::Pending => return Poll::Pending,
                        Poll::Ready(granted) => granted,
                    };
                    if !granted || platform.status() == LocationStatus::Disabled {
                        log::info!("Location service is disabled by the user");
                        return self.finish(Err(SoftFailure::LocationDisabled));
                    }
                    log::info!("Starting location service");
                    platform.start();
                    self.phase = LocationPhase::Starting {
                        deadline: self.start_timeout.map(|t| now.saturating_add(t)),
                    };
                }
                LocationPhase::Starting { deadline } => {
                    let status = platform.status();
                    if status == LocationStatus::Initializing {
                        if !deadline_passed(now, deadline) {
                            return Poll::Pending;
                        }
                        log::warn!("Location service did not leave Initializing in time");
                        platform.stop();
                        return self.finish(Err(SoftFailure::LocationStartTimedOut));
                    }
                    if status != LocationStatus::Running {
                        log::warn!("Location service ended with {status:?} status");
                        platform.stop();
                        return self.finish(Err(SoftFailure::LocationNotRunning(status)));
                    }
                    return self.finish(Ok(()));
                }
                LocationPhase::Finished(outcome) => return Poll::Ready(outcome),
            }
        }
    }

    /// True until the step has concluded.
    pub(crate) fn in_progress(&self) -> bool {
        !matches!(self.phase, LocationPhase::Finished(_))
    }

    fn finish(&mut self, outcome: Result<(), SoftFailure>) -> Poll<Result<(), SoftFailure>> {
        self.phase = LocationPhase::Finished(outcome);
        Poll::Ready(outcome)
    }
}

// ---------------------------------------------------------------------------
// AR runtime readiness
// ---------------------------------------------------------------------------

enum RuntimePhase {
    Begin,
    AwaitCheck {
        promise: Box<dyn Promise<()>>,
        deadline: Option<u64>,
    },
    AfterCheck,
    AwaitInstall {
        promise: Box<dyn Promise<()>>,
        deadline: Option<u64>,
    },
    /// One-tick yield before reporting success.
    Yielded,
    Finished(Result<(), SoftFailure>),
}

/// Run the runtime availability check and, if needed, the install request.
///
/// Always yields at least one tick after the availability check so the
/// runtime state can reflect its result.
pub(crate) struct RuntimeReadiness {
    op_timeout: Option<u64>,
    yield_after_install: bool,
    phase: RuntimePhase,
}

impl RuntimeReadiness {
    pub(crate) fn new(op_timeout: Option<u64>, yield_after_install: bool) -> Self {
        Self {
            op_timeout,
            yield_after_install,
            phase: RuntimePhase::Begin,
        }
    }

    pub(crate) fn poll<P>(&mut self, now: u64, platform: &mut P) -> Poll<Result<(), SoftFailure>>
    where
        P: ArRuntime + ?Sized,
    {
        loop {
            match &mut self.phase {
                RuntimePhase::Begin => {
                    if platform.runtime_state() == SessionRuntimeState::None {
                        log::info!("Checking AR runtime availability");
                        self.phase = RuntimePhase::AwaitCheck {
                            promise: platform.request_availability_check(),
                            deadline: self.deadline_from(now),
                        };
                    } else {
                        self.phase = RuntimePhase::AfterCheck;
                        return Poll::Pending;
                    }
                }
                RuntimePhase::AwaitCheck { promise, deadline } => match promise.poll() {
                    PromiseState::Pending => {
                        if deadline_passed(now, *deadline) {
                            log::warn!("AR runtime availability check timed out");
                            return self.finish(Err(SoftFailure::RuntimeRequestTimedOut));
                        }
                        return Poll::Pending;
                    }
                    PromiseState::Done(()) | PromiseState::Cancelled => {
                        self.phase = RuntimePhase::AfterCheck;
                        return Poll::Pending;
                    }
                },
                RuntimePhase::AfterCheck => {
                    if platform.runtime_state() != SessionRuntimeState::NeedsInstall {
                        return self.finish(Ok(()));
                    }
                    log::info!("Requesting AR runtime install");
                    self.phase = RuntimePhase::AwaitInstall {
                        promise: platform.request_install(),
                        deadline: self.deadline_from(now),
                    };
                }
                RuntimePhase::AwaitInstall { promise, deadline } => match promise.poll() {
                    PromiseState::Pending => {
                        if deadline_passed(now, *deadline) {
                            log::warn!("AR runtime install timed out");
                            return self.finish(Err(SoftFailure::RuntimeRequestTimedOut));
                        }
                        return Poll::Pending;
                    }
                    PromiseState::Done(()) | PromiseState::Cancelled => {
                        if !self.yield_after_install {
                            return self.finish(Ok(()));
                        }
                        self.phase = RuntimePhase::Yielded;
                        return Poll::Pending;
                    }
                },
                RuntimePhase::Yielded => return self.finish(Ok(())),
                RuntimePhase::Finished(outcome) => return Poll::Ready(*outcome),
            }
        }
    }

    fn deadline_from(&self, now: u64) -> Option<u64> {
        self.op_timeout.map(|t| now.saturating_add(t))
    }

    fn finish(&mut self, outcome: Result<(), SoftFailure>) -> Poll<Result<(), SoftFailure>> {
        self.phase = RuntimePhase::Finished(outcome);
        Poll::Ready(outcome)
    }
}

// ---------------------------------------------------------------------------
// Session availability (bootstrap step 2)
// ---------------------------------------------------------------------------

enum SessionPhase {
    Runtime,
    Camera,
    Finished,
}

/// Runtime readiness followed by the camera permission.
///
/// Resolves to the soft failures observed; none of them stop the sequence.
pub(crate) struct SessionAvailability {
    runtime: RuntimeReadiness,
    camera: PermissionGate,
    phase: SessionPhase,
    failures: Vec<SoftFailure>,
}

impl SessionAvailability {
    pub(crate) fn new(settle: u64, op_timeout: Option<u64>) -> Self {
        Self {
            runtime: RuntimeReadiness::new(op_timeout, false),
            camera: PermissionGate::new(PermissionKind::Camera, settle),
            phase: SessionPhase::Runtime,
            failures: Vec::new(),
        }
    }

    pub(crate) fn poll<P>(&mut self, now: u64, platform: &mut P) -> Poll<Vec<SoftFailure>>
    where
        P: Permissions + ArRuntime + ?Sized,
    {
        loop {
            match self.phase {
                SessionPhase::Runtime => match self.runtime.poll(now, platform) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(outcome) => {
                        if let Err(soft) = outcome {
                            self.failures.push(soft);
                        }
                        self.phase = SessionPhase::Camera;
                    }
                },
                SessionPhase::Camera => match self.camera.poll(now, platform) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(granted) => {
                        if !granted {
                            log::warn!(
                                "Failed to get the camera permission; positioning availability check is not available"
                            );
                            self.failures.push(SoftFailure::CameraPermissionDenied);
                        }
                        self.phase = SessionPhase::Finished;
                        return Poll::Ready(std::mem::take(&mut self.failures));
                    }
                },
                SessionPhase::Finished => return Poll::Ready(Vec::new()),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Feature support (bootstrap step 3)
// ---------------------------------------------------------------------------

enum FeaturePhase {
    Poll,
    Settling { deadline: u64 },
    Waiting { deadline: u64 },
    Finished(Result<(), HardFailure>),
}

/// Negotiate the geospatial capability and wait for the earth state to enable.
///
/// Polls without an upper bound until the earth state is `Enabled` or the
/// capability is reported unsupported.
pub(crate) struct FeatureSupportCheck {
    settle: u64,
    interval: u64,
    phase: FeaturePhase,
}

impl FeatureSupportCheck {
    pub(crate) fn new(settle: u64, interval: u64) -> Self {
        Self {
            settle,
            interval,
            phase: FeaturePhase::Poll,
        }
    }

    pub(crate) fn poll<P>(&mut self, now: u64, platform: &mut P) -> Poll<Result<(), HardFailure>>
    where
        P: ArRuntime + GeospatialCapability + ?Sized,
    {
        loop {
            match self.phase {
                FeaturePhase::Poll => {
                    if !platform.runtime_state().is_session_active() {
                        return self.wait(now);
                    }
                    match platform.is_supported(GeospatialMode::Enabled) {
                        FeatureSupport::Unsupported => {
                            self.phase =
                                FeaturePhase::Finished(Err(HardFailure::GeospatialUnsupported));
                        }
                        FeatureSupport::Supported => {
                            if platform.configuration().geospatial == GeospatialMode::Disabled {
                                log::info!("Switching geospatial mode to Enabled");
                                platform.configure(CapabilityConfig::ENABLED);
                                self.phase = FeaturePhase::Settling {
                                    deadline: now.saturating_add(self.settle),
                                };
                                return Poll::Pending;
                            }
                            return self.check_earth(now, platform);
                        }
                        FeatureSupport::Unknown => return self.wait(now),
                    }
                }
                FeaturePhase::Settling { deadline } => {
                    if now < deadline {
                        return Poll::Pending;
                    }
                    return self.check_earth(now, platform);
                }
                FeaturePhase::Waiting { deadline } => {
                    if now < deadline {
                        return Poll::Pending;
                    }
                    self.phase = FeaturePhase::Poll;
                }
                FeaturePhase::Finished(outcome) => return Poll::Ready(outcome),
            }
        }
    }

    fn check_earth<P>(&mut self, now: u64, platform: &P) -> Poll<Result<(), HardFailure>>
    where
        P: GeospatialCapability + ?Sized,
    {
        let earth = platform.earth_state();
        if earth == EarthState::Enabled {
            self.phase = FeaturePhase::Finished(Ok(()));
            return Poll::Ready(Ok(()));
        }
        log::debug!("Earth state: {earth:?}");
        self.wait(now)
    }

    fn wait(&mut self, now: u64) -> Poll<Result<(), HardFailure>> {
        self.phase = FeaturePhase::Waiting {
            deadline: now.saturating_add(self.interval),
        };
        Poll::Pending
    }
}
