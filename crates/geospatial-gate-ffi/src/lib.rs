//! Geospatial gate C FFI bindings.
//!
//! Provides a C-compatible API for a mobile host: the accuracy predicate,
//! pruning of a stored anchor-history blob, and a lifecycle controller fed
//! one [`GgFrame`] of observed platform state per tick.
//!
#![allow(clippy::doc_overindented_list_items)]
//! # Driving the controller
//!
//! The host owns every platform service. Each frame it fills a [`GgFrame`]
//! with what it observes and calls [`gg_controller_tick`]. Actions the
//! controller wants performed are collected as `GG_REQ_*` bits and drained
//! with [`gg_controller_take_requests`]. When an asynchronous runtime request
//! (availability check or install) finishes, the host reports it with
//! [`gg_controller_complete`].
//!
//! After `GG_REQ_LOCATION_START` is issued, a frame reporting `Stopped` (0)
//! is read as `Initializing` until the host reports any other status. Hosts
//! report `Disabled` (3) or `Failed` (4) when the service cannot start.
//!
//! # Memory contract
//!
//! - All `*mut c_char` output strings are heap-allocated via [`CString`] and
//!   **must** be freed by the caller using [`gg_free_string`].
//! - Opaque controller handles are heap-allocated Rust `Box`es and **must** be
//!   freed using [`gg_controller_free`].
//! - The static string returned by [`gg_version`] must **not** be freed.
//!
//! # Error codes
//!
//! | Constant                 | Value | Meaning                              |
//! |--------------------------|-------|--------------------------------------|
//! | `GG_OK`                  | 0     | Success                              |
//! | `GG_ERR_NULL_PTR`        | -1    | A required pointer was null          |
//! | `GG_ERR_INVALID_UTF8`    | -2    | A string was not valid UTF-8         |
//! | `GG_ERR_INVALID_ARGUMENT`| -3    | An argument was out of range         |
//! | `GG_ERR_IO`              | -4    | Filesystem I/O failure               |
//! | `GG_ERR_SERIALIZATION`   | -5    | JSON serialization/parse failure     |
//! | `GG_ERR_NOT_FOUND`       | -6    | Nothing to act on                    |
//! | `GG_ERR_INVALID_CONFIG`  | -7    | Configuration rejected               |

use std::cell::Cell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::rc::Rc;

use geospatial_gate::config::HistoryConfig;
use geospatial_gate::ports::{
    ArRuntime, CapabilityConfig, EarthState, FeatureSupport, GeospatialCapability,
    GeospatialMode, LocationService, LocationStatus, PermissionKind, Permissions, Promise,
    PromiseState, SessionRuntimeState, StreetscapeGeometryMode, TrackingState,
};
use geospatial_gate::storage::ANCHOR_HISTORY_KEY;
use geospatial_gate::{
    is_localized, AnchorHistoryStore, BootstrapState, GateConfig, GateError, GeoCoordinates,
    KeyValueStore, LifecycleController, LifecycleState, MemoryStore, PoseSample, Quaternion,
    UiEffect,
};

// ── Error codes ───────────────────────────────────────────────────────────────

/// Success.
pub const GG_OK: i32 = 0;
/// A required pointer argument was null.
pub const GG_ERR_NULL_PTR: i32 = -1;
/// A string argument contained invalid UTF-8.
pub const GG_ERR_INVALID_UTF8: i32 = -2;
/// A numeric argument or enum code was out of range.
pub const GG_ERR_INVALID_ARGUMENT: i32 = -3;
/// A filesystem I/O operation failed.
pub const GG_ERR_IO: i32 = -4;
/// A JSON serialization or deserialization operation failed.
pub const GG_ERR_SERIALIZATION: i32 = -5;
/// There was nothing to act on (e.g. no pending request to complete).
pub const GG_ERR_NOT_FOUND: i32 = -6;
/// A configuration document was rejected.
pub const GG_ERR_INVALID_CONFIG: i32 = -7;

// ── Request bits ──────────────────────────────────────────────────────────────

pub const GG_REQ_LOCATION_PERMISSION: u32 = 1 << 0;
pub const GG_REQ_CAMERA_PERMISSION: u32 = 1 << 1;
pub const GG_REQ_LOCATION_START: u32 = 1 << 2;
pub const GG_REQ_LOCATION_STOP: u32 = 1 << 3;
pub const GG_REQ_AVAILABILITY_CHECK: u32 = 1 << 4;
pub const GG_REQ_INSTALL: u32 = 1 << 5;
/// Enable geospatial mode and streetscape geometry.
pub const GG_REQ_ENABLE_GEOSPATIAL: u32 = 1 << 6;
pub const GG_REQ_DISABLE_GEOSPATIAL: u32 = 1 << 7;
/// Show the AR view and hide the privacy prompt.
pub const GG_REQ_SHOW_AR_VIEW: u32 = 1 << 8;

// ── Frame ─────────────────────────────────────────────────────────────────────

/// Platform state observed by the host for one frame.
///
/// Enum fields use these codes:
///
/// - `location_status`: 0 stopped, 1 initializing, 2 running, 3 disabled, 4 failed
/// - `runtime_state`: 0 none, 1 unsupported, 2 checking availability,
///   3 needs install, 4 installing, 5 ready, 6 session initializing,
///   7 session tracking, 8 error
/// - `feature_support`: 0 supported, 1 unsupported, 2 unknown
/// - `earth_state`: 0 enabled, 1 internal error, 2 geospatial mode disabled,
///   3 not authorized, 4 resources exhausted, 5 package not present,
///   6 unsupported configuration
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GgFrame {
    pub location_permission: libc::c_int,
    pub camera_permission: libc::c_int,
    pub location_status: i32,
    pub has_coordinates: libc::c_int,
    pub runtime_state: i32,
    pub feature_support: i32,
    pub geospatial_enabled: libc::c_int,
    pub earth_state: i32,
    pub tracking: libc::c_int,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub horizontal_accuracy: f64,
    pub vertical_accuracy: f64,
    pub yaw_accuracy: f64,
    pub heading_x: f64,
    pub heading_y: f64,
    pub heading_z: f64,
    pub heading_w: f64,
}

/// Typed view of a [`GgFrame`], validated once per tick.
#[derive(Debug, Clone, Copy)]
struct Observed {
    location_permission: bool,
    camera_permission: bool,
    location_status: LocationStatus,
    coordinates: Option<GeoCoordinates>,
    runtime_state: SessionRuntimeState,
    feature_support: FeatureSupport,
    configuration: CapabilityConfig,
    earth_state: EarthState,
    tracking: bool,
    pose: PoseSample,
}

fn location_status_from_code(code: i32) -> Option<LocationStatus> {
    Some(match code {
        0 => LocationStatus::Stopped,
        1 => LocationStatus::Initializing,
        2 => LocationStatus::Running,
        3 => LocationStatus::Disabled,
        4 => LocationStatus::Failed,
        _ => return None,
    })
}

fn runtime_state_from_code(code: i32) -> Option<SessionRuntimeState> {
    Some(match code {
        0 => SessionRuntimeState::None,
        1 => SessionRuntimeState::Unsupported,
        2 => SessionRuntimeState::CheckingAvailability,
        3 => SessionRuntimeState::NeedsInstall,
        4 => SessionRuntimeState::Installing,
        5 => SessionRuntimeState::Ready,
        6 => SessionRuntimeState::SessionInitializing,
        7 => SessionRuntimeState::SessionTracking,
        8 => SessionRuntimeState::Error,
        _ => return None,
    })
}

fn feature_support_from_code(code: i32) -> Option<FeatureSupport> {
    Some(match code {
        0 => FeatureSupport::Supported,
        1 => FeatureSupport::Unsupported,
        2 => FeatureSupport::Unknown,
        _ => return None,
    })
}

fn earth_state_from_code(code: i32) -> Option<EarthState> {
    Some(match code {
        0 => EarthState::Enabled,
        1 => EarthState::ErrorInternal,
        2 => EarthState::ErrorGeospatialModeDisabled,
        3 => EarthState::ErrorNotAuthorized,
        4 => EarthState::ErrorResourcesExhausted,
        5 => EarthState::ErrorPackageNotPresent,
        6 => EarthState::ErrorUnsupportedConfiguration,
        _ => return None,
    })
}

fn lifecycle_code(state: LifecycleState) -> i32 {
    match state {
        LifecycleState::Initializing => 0,
        LifecycleState::Localizing => 1,
        LifecycleState::Loading => 2,
        LifecycleState::Ready => 3,
        LifecycleState::Error => 4,
    }
}

fn bootstrap_code(state: BootstrapState) -> i32 {
    match state {
        BootstrapState::NotStarted => 0,
        BootstrapState::StartLocationService => 1,
        BootstrapState::StartAvailabilityCheck => 2,
        BootstrapState::StartFeatureSupportCheck => 3,
        BootstrapState::Complete => 4,
        BootstrapState::Error => 5,
    }
}

impl GgFrame {
    fn observe(&self) -> Option<Observed> {
        let configuration = if self.geospatial_enabled != 0 {
            CapabilityConfig::ENABLED
        } else {
            CapabilityConfig::DISABLED
        };
        Some(Observed {
            location_permission: self.location_permission != 0,
            camera_permission: self.camera_permission != 0,
            location_status: location_status_from_code(self.location_status)?,
            coordinates: (self.has_coordinates != 0)
                .then(|| GeoCoordinates::new(self.latitude, self.longitude, self.altitude)),
            runtime_state: runtime_state_from_code(self.runtime_state)?,
            feature_support: feature_support_from_code(self.feature_support)?,
            configuration,
            earth_state: earth_state_from_code(self.earth_state)?,
            tracking: self.tracking != 0,
            pose: PoseSample {
                latitude: self.latitude,
                longitude: self.longitude,
                altitude: self.altitude,
                horizontal_accuracy: self.horizontal_accuracy,
                vertical_accuracy: self.vertical_accuracy,
                yaw_accuracy: self.yaw_accuracy,
                heading_rotation: Quaternion {
                    x: self.heading_x,
                    y: self.heading_y,
                    z: self.heading_z,
                    w: self.heading_w,
                },
            },
        })
    }
}

// ── Frame-fed platform ────────────────────────────────────────────────────────

/// Promise completed by the host through [`gg_controller_complete`].
struct HostPromise(Rc<Cell<bool>>);

impl Promise<()> for HostPromise {
    fn poll(&mut self) -> PromiseState<()> {
        if self.0.get() {
            PromiseState::Done(())
        } else {
            PromiseState::Pending
        }
    }
}

/// Platform view built from host frames; requests become `GG_REQ_*` bits.
///
/// Requests made during a tick are reflected locally (e.g. a started
/// location service reads as `Initializing`) until the next frame arrives.
/// A start stays pending until the host reports a status other than
/// `Stopped`, so frames captured before the host acted on the request do
/// not read as a failed start.
struct FramePlatform {
    observed: Observed,
    requests: u32,
    location_start_pending: bool,
    pending_check: Option<Rc<Cell<bool>>>,
    pending_install: Option<Rc<Cell<bool>>>,
}

impl FramePlatform {
    fn new() -> Self {
        Self {
            observed: Observed {
                location_permission: false,
                camera_permission: false,
                location_status: LocationStatus::Stopped,
                coordinates: None,
                runtime_state: SessionRuntimeState::None,
                feature_support: FeatureSupport::Unknown,
                configuration: CapabilityConfig::DISABLED,
                earth_state: EarthState::ErrorGeospatialModeDisabled,
                tracking: false,
                pose: PoseSample::NOT_TRACKING,
            },
            requests: 0,
            location_start_pending: false,
            pending_check: None,
            pending_install: None,
        }
    }

    /// Replace the observed state with the host's latest frame.
    fn apply_frame(&mut self, mut observed: Observed) {
        if self.location_start_pending {
            if observed.location_status == LocationStatus::Stopped {
                observed.location_status = LocationStatus::Initializing;
            } else {
                self.location_start_pending = false;
            }
        }
        self.observed = observed;
    }

    fn issue(&mut self, bit: u32) -> Box<dyn Promise<()>> {
        let done = Rc::new(Cell::new(false));
        let slot = if bit == GG_REQ_INSTALL {
            &mut self.pending_install
        } else {
            &mut self.pending_check
        };
        *slot = Some(Rc::clone(&done));
        self.requests |= bit;
        Box::new(HostPromise(done))
    }
}

impl Permissions for FramePlatform {
    fn has_permission(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::FineLocation => self.observed.location_permission,
            PermissionKind::Camera => self.observed.camera_permission,
        }
    }

    fn request_permission(&mut self, kind: PermissionKind) {
        self.requests |= match kind {
            PermissionKind::FineLocation => GG_REQ_LOCATION_PERMISSION,
            PermissionKind::Camera => GG_REQ_CAMERA_PERMISSION,
        };
    }
}

impl LocationService for FramePlatform {
    fn status(&self) -> LocationStatus {
        self.observed.location_status
    }

    fn start(&mut self) {
        self.requests |= GG_REQ_LOCATION_START;
        if self.observed.location_status != LocationStatus::Disabled {
            self.observed.location_status = LocationStatus::Initializing;
            self.location_start_pending = true;
        }
    }

    fn stop(&mut self) {
        self.requests |= GG_REQ_LOCATION_STOP;
        self.location_start_pending = false;
        if self.observed.location_status != LocationStatus::Disabled {
            self.observed.location_status = LocationStatus::Stopped;
        }
    }

    fn last_known_coordinates(&self) -> Option<GeoCoordinates> {
        self.observed.coordinates
    }
}

impl ArRuntime for FramePlatform {
    fn runtime_state(&self) -> SessionRuntimeState {
        self.observed.runtime_state
    }

    fn request_availability_check(&mut self) -> Box<dyn Promise<()>> {
        self.observed.runtime_state = SessionRuntimeState::CheckingAvailability;
        self.issue(GG_REQ_AVAILABILITY_CHECK)
    }

    fn request_install(&mut self) -> Box<dyn Promise<()>> {
        self.observed.runtime_state = SessionRuntimeState::Installing;
        self.issue(GG_REQ_INSTALL)
    }
}

impl GeospatialCapability for FramePlatform {
    fn is_supported(&self, mode: GeospatialMode) -> FeatureSupport {
        match mode {
            GeospatialMode::Disabled => FeatureSupport::Supported,
            GeospatialMode::Enabled => self.observed.feature_support,
        }
    }

    fn configuration(&self) -> CapabilityConfig {
        self.observed.configuration
    }

    fn configure(&mut self, config: CapabilityConfig) {
        self.requests |= match config.geospatial {
            GeospatialMode::Enabled => GG_REQ_ENABLE_GEOSPATIAL,
            GeospatialMode::Disabled => GG_REQ_DISABLE_GEOSPATIAL,
        };
        self.observed.configuration = CapabilityConfig {
            geospatial: config.geospatial,
            streetscape_geometry: if config.geospatial == GeospatialMode::Enabled {
                StreetscapeGeometryMode::Enabled
            } else {
                config.streetscape_geometry
            },
        };
    }

    fn earth_state(&self) -> EarthState {
        self.observed.earth_state
    }

    fn tracking_state(&self) -> TrackingState {
        if self.observed.tracking {
            TrackingState::Tracking
        } else {
            TrackingState::NotTracking
        }
    }

    fn camera_pose(&self) -> PoseSample {
        self.observed.pose
    }
}

/// Opaque controller handle.
struct FfiController {
    controller: LifecycleController,
    platform: FramePlatform,
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Convert a `*const c_char` to a `&str`, returning an error code on failure.
///
/// # Safety
///
/// `ptr` must either be null (handled gracefully) or point to a valid,
/// null-terminated C string that remains valid for the duration of `'a`.
unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Result<&'a str, i32> {
    if ptr.is_null() {
        return Err(GG_ERR_NULL_PTR);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| GG_ERR_INVALID_UTF8)
}

/// Allocate a `CString` and write it into `*out`, returning an error code on
/// failure.
///
/// # Safety
///
/// `out` must be non-null.
unsafe fn write_string_out(s: String, out: *mut *mut c_char) -> i32 {
    if out.is_null() {
        return GG_ERR_NULL_PTR;
    }
    match CString::new(s) {
        Ok(cs) => {
            *out = cs.into_raw();
            GG_OK
        }
        Err(_) => GG_ERR_SERIALIZATION,
    }
}

/// Map a [`GateError`] to one of the `GG_ERR_*` constants.
fn map_error(e: &GateError) -> i32 {
    match e {
        GateError::Io(_) => GG_ERR_IO,
        GateError::Serialization(_) | GateError::Storage(_) => GG_ERR_SERIALIZATION,
        GateError::InvalidConfig(_) => GG_ERR_INVALID_CONFIG,
        GateError::NotFound(_) => GG_ERR_NOT_FOUND,
    }
}

// ── Version ───────────────────────────────────────────────────────────────────

/// Return the library version string as a null-terminated C string.
///
/// The returned pointer points to a `'static` string embedded in the binary.
/// The caller **must not** free this pointer.
#[no_mangle]
pub extern "C" fn gg_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

// ── Accuracy gate ─────────────────────────────────────────────────────────────

/// Evaluate the accuracy gate.
///
/// Writes `1` into `*localized_out` iff `tracking` is non-zero and every
/// accuracy is strictly below `threshold`, `0` otherwise.
///
/// # Safety
///
/// `localized_out` must be non-null.
#[no_mangle]
pub unsafe extern "C" fn gg_is_localized(
    horizontal_accuracy: f64,
    vertical_accuracy: f64,
    yaw_accuracy: f64,
    tracking: libc::c_int,
    threshold: f64,
    localized_out: *mut libc::c_int,
) -> i32 {
    if localized_out.is_null() {
        return GG_ERR_NULL_PTR;
    }
    let pose = PoseSample::with_accuracy(horizontal_accuracy, vertical_accuracy, yaw_accuracy);
    *localized_out = is_localized(&pose, tracking != 0, threshold) as libc::c_int;
    GG_OK
}

// ── Anchor history ────────────────────────────────────────────────────────────

/// Prune a stored anchor-history blob with the default history limits.
///
/// # Parameters
///
/// - `history_json`: the blob as stored under the history key.
/// - `now_local_secs`: current device-local wall-clock time, as seconds
///   since 1970-01-01 00:00:00 in local time.
/// - `pruned_json_out`: on success, receives the pruned blob; the caller
///   must free it with [`gg_free_string`].
///
/// # Safety
///
/// `history_json` and `pruned_json_out` must be non-null.
#[no_mangle]
pub unsafe extern "C" fn gg_history_prune(
    history_json: *const c_char,
    now_local_secs: i64,
    pruned_json_out: *mut *mut c_char,
) -> i32 {
    let blob = match cstr_to_str(history_json) {
        Ok(s) => s,
        Err(e) => return e,
    };
    if pruned_json_out.is_null() {
        return GG_ERR_NULL_PTR;
    }
    let Some(now) = chrono::DateTime::from_timestamp(now_local_secs, 0).map(|t| t.naive_utc())
    else {
        return GG_ERR_INVALID_ARGUMENT;
    };

    let mut mem = MemoryStore::new();
    if let Err(e) = mem.set_string(ANCHOR_HISTORY_KEY, blob) {
        return map_error(&e);
    }
    let mut store = AnchorHistoryStore::new(mem, HistoryConfig::default());
    if let Err(e) = store.load(now) {
        return map_error(&e);
    }
    match store.store().get_string(ANCHOR_HISTORY_KEY) {
        Some(pruned) => write_string_out(pruned, pruned_json_out),
        None => GG_ERR_NOT_FOUND,
    }
}

// ── Lifecycle controller ──────────────────────────────────────────────────────

/// Create a lifecycle controller.
///
/// # Parameters
///
/// - `config_json`: JSON configuration; pass `NULL` for defaults.
/// - `controller_out`: on success, receives an opaque handle that must be
///   released with [`gg_controller_free`].
///
/// # Safety
///
/// `controller_out` must be non-null; `config_json` must be null or a valid
/// C string.
#[no_mangle]
pub unsafe extern "C" fn gg_controller_new(
    config_json: *const c_char,
    controller_out: *mut *mut std::ffi::c_void,
) -> i32 {
    if controller_out.is_null() {
        return GG_ERR_NULL_PTR;
    }
    let config = if config_json.is_null() {
        GateConfig::default()
    } else {
        let json = match cstr_to_str(config_json) {
            Ok(s) => s,
            Err(e) => return e,
        };
        match GateConfig::from_json_str(json) {
            Ok(c) => c,
            Err(e) => return map_error(&e),
        }
    };

    let handle = FfiController {
        controller: LifecycleController::new(&config),
        platform: FramePlatform::new(),
    };
    *controller_out = Box::into_raw(Box::new(handle)) as *mut std::ffi::c_void;
    GG_OK
}

/// Free a controller handle. Passing `NULL` is a no-op.
///
/// # Safety
///
/// `controller` must be null or a handle from [`gg_controller_new`] that has
/// not already been freed.
#[no_mangle]
pub unsafe extern "C" fn gg_controller_free(controller: *mut std::ffi::c_void) {
    if !controller.is_null() {
        drop(Box::from_raw(controller as *mut FfiController));
    }
}

/// Feed one frame and tick the controller once.
///
/// On success the lifecycle state code (0 initializing, 1 localizing,
/// 2 loading, 3 ready, 4 error) is written into `*state_out`.
///
/// # Safety
///
/// All pointers must be non-null; `controller` must come from
/// [`gg_controller_new`].
#[no_mangle]
pub unsafe extern "C" fn gg_controller_tick(
    controller: *mut std::ffi::c_void,
    now_micros: u64,
    frame: *const GgFrame,
    state_out: *mut i32,
) -> i32 {
    if controller.is_null() || frame.is_null() || state_out.is_null() {
        return GG_ERR_NULL_PTR;
    }
    let handle = &mut *(controller as *mut FfiController);
    let Some(observed) = (*frame).observe() else {
        return GG_ERR_INVALID_ARGUMENT;
    };
    handle.platform.apply_frame(observed);

    let report = handle.controller.tick(now_micros, &mut handle.platform);
    for effect in report.effects {
        match effect {
            UiEffect::SwitchToArView(true) => handle.platform.requests |= GG_REQ_SHOW_AR_VIEW,
            UiEffect::SwitchToArView(false) => {}
        }
    }
    *state_out = lifecycle_code(report.current);
    GG_OK
}

/// Return and clear the `GG_REQ_*` bits accumulated since the last call.
///
/// Returns 0 for a null handle.
///
/// # Safety
///
/// `controller` must be null or a handle from [`gg_controller_new`].
#[no_mangle]
pub unsafe extern "C" fn gg_controller_take_requests(controller: *mut std::ffi::c_void) -> u32 {
    if controller.is_null() {
        return 0;
    }
    let handle = &mut *(controller as *mut FfiController);
    std::mem::take(&mut handle.platform.requests)
}

/// Report that an asynchronous runtime request has finished.
///
/// `op` is [`GG_REQ_AVAILABILITY_CHECK`] or [`GG_REQ_INSTALL`]. Returns
/// `GG_ERR_NOT_FOUND` if no such request is outstanding.
///
/// # Safety
///
/// `controller` must be a handle from [`gg_controller_new`].
#[no_mangle]
pub unsafe extern "C" fn gg_controller_complete(controller: *mut std::ffi::c_void, op: u32) -> i32 {
    if controller.is_null() {
        return GG_ERR_NULL_PTR;
    }
    let handle = &mut *(controller as *mut FfiController);
    let slot = match op {
        GG_REQ_AVAILABILITY_CHECK => &mut handle.platform.pending_check,
        GG_REQ_INSTALL => &mut handle.platform.pending_install,
        _ => return GG_ERR_INVALID_ARGUMENT,
    };
    match slot.take() {
        Some(done) => {
            done.set(true);
            GG_OK
        }
        None => GG_ERR_NOT_FOUND,
    }
}

/// Return the bootstrap state code (0 not started, 1 location service,
/// 2 availability check, 3 feature support check, 4 complete, 5 error), or
/// `GG_ERR_NULL_PTR`.
///
/// # Safety
///
/// `controller` must be null or a handle from [`gg_controller_new`].
#[no_mangle]
pub unsafe extern "C" fn gg_controller_bootstrap_state(controller: *const std::ffi::c_void) -> i32 {
    if controller.is_null() {
        return GG_ERR_NULL_PTR;
    }
    let handle = &*(controller as *const FfiController);
    bootstrap_code(handle.controller.bootstrap().state())
}

/// Write the bootstrap run's soft failures as a JSON array into `*json_out`.
///
/// # Safety
///
/// Both pointers must be non-null; the string must be freed with
/// [`gg_free_string`].
#[no_mangle]
pub unsafe extern "C" fn gg_controller_soft_failures(
    controller: *const std::ffi::c_void,
    json_out: *mut *mut c_char,
) -> i32 {
    if controller.is_null() {
        return GG_ERR_NULL_PTR;
    }
    let handle = &*(controller as *const FfiController);
    match serde_json::to_string(handle.controller.bootstrap().soft_failures()) {
        Ok(json) => write_string_out(json, json_out),
        Err(_) => GG_ERR_SERIALIZATION,
    }
}

// ── Memory management ─────────────────────────────────────────────────────────

/// Free a string previously returned by this library.
///
/// Passing `NULL` is a no-op.
///
/// # Safety
///
/// `s` must be either null or a pointer returned by one of the `gg_*`
/// functions in this crate that has not already been freed.
#[no_mangle]
pub unsafe extern "C" fn gg_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
