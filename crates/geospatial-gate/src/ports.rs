//! Adapter ports to the platform services the core drives.
//!
//! The core never constructs or mutates platform state directly; it reads it
//! and issues requests through these traits. Async requests are represented
//! by a [`Promise`] polled once per tick.

use serde::{Deserialize, Serialize};

use crate::pose::{GeoCoordinates, PoseSample};

// ── Async requests ────────────────────────────────────────────────────────────

/// Observed state of an in-flight asynchronous request.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState<T> {
    Pending,
    Done(T),
    Cancelled,
}

/// One in-flight asynchronous request.
///
/// A promise can be dropped (its result ignored) but never aborted.
pub trait Promise<T> {
    /// Observe the request without blocking.
    fn poll(&mut self) -> PromiseState<T>;
}

// ── Permissions ───────────────────────────────────────────────────────────────

/// Runtime permissions the bring-up sequence needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionKind {
    FineLocation,
    Camera,
}

pub trait Permissions {
    fn has_permission(&self, kind: PermissionKind) -> bool;
    /// Show the platform permission prompt. The answer arrives asynchronously.
    fn request_permission(&mut self, kind: PermissionKind);
}

// ── Location service ─────────────────────────────────────────────────────────

/// Status reported by the platform location service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationStatus {
    Stopped,
    Initializing,
    Running,
    /// Disabled by the user or by device policy.
    Disabled,
    Failed,
}

pub trait LocationService {
    fn status(&self) -> LocationStatus;
    fn start(&mut self);
    fn stop(&mut self);
    fn last_known_coordinates(&self) -> Option<GeoCoordinates>;
}

// ── AR runtime ────────────────────────────────────────────────────────────────

/// Externally-owned state of the AR runtime session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionRuntimeState {
    None,
    Unsupported,
    CheckingAvailability,
    NeedsInstall,
    Installing,
    Ready,
    SessionInitializing,
    SessionTracking,
    Error,
}

impl SessionRuntimeState {
    /// A session exists and is initializing or tracking.
    pub fn is_session_active(self) -> bool {
        matches!(
            self,
            SessionRuntimeState::SessionInitializing | SessionRuntimeState::SessionTracking
        )
    }
}

pub trait ArRuntime {
    fn runtime_state(&self) -> SessionRuntimeState;
    /// Ask the runtime to determine whether AR is available on this device.
    fn request_availability_check(&mut self) -> Box<dyn Promise<()>>;
    /// Ask the runtime to install or update its services.
    fn request_install(&mut self) -> Box<dyn Promise<()>>;
}

// ── Geospatial capability ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeospatialMode {
    Disabled,
    Enabled,
}

/// The enhanced-geometry capability enabled alongside geospatial mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreetscapeGeometryMode {
    Disabled,
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureSupport {
    Supported,
    Unsupported,
    Unknown,
}

/// Capability configuration applied to the runtime session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityConfig {
    pub geospatial: GeospatialMode,
    pub streetscape_geometry: StreetscapeGeometryMode,
}

impl CapabilityConfig {
    pub const DISABLED: CapabilityConfig = CapabilityConfig {
        geospatial: GeospatialMode::Disabled,
        streetscape_geometry: StreetscapeGeometryMode::Disabled,
    };

    pub const ENABLED: CapabilityConfig = CapabilityConfig {
        geospatial: GeospatialMode::Enabled,
        streetscape_geometry: StreetscapeGeometryMode::Enabled,
    };
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// State of the runtime's earth localization subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarthState {
    Enabled,
    ErrorInternal,
    ErrorGeospatialModeDisabled,
    ErrorNotAuthorized,
    ErrorResourcesExhausted,
    ErrorPackageNotPresent,
    ErrorUnsupportedConfiguration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingState {
    Tracking,
    NotTracking,
}

pub trait GeospatialCapability {
    fn is_supported(&self, mode: GeospatialMode) -> FeatureSupport;
    fn configuration(&self) -> CapabilityConfig;
    fn configure(&mut self, config: CapabilityConfig);
    fn earth_state(&self) -> EarthState;
    fn tracking_state(&self) -> TrackingState;
    /// Camera pose; only meaningful while tracking.
    fn camera_pose(&self) -> PoseSample;
}

// ── Positioning availability ─────────────────────────────────────────────────

/// Answer of the positioning-service availability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositioningAvailability {
    Available,
    Unavailable,
    ErrorNetworkConnection,
    ErrorInternal,
}

pub trait PositioningService {
    fn query_availability(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Box<dyn Promise<PositioningAvailability>>;
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// Every port at once; implemented automatically for any type that has them all.
pub trait Platform:
    Permissions + LocationService + ArRuntime + GeospatialCapability + PositioningService
{
}

impl<T> Platform for T where
    T: Permissions + LocationService + ArRuntime + GeospatialCapability + PositioningService
{
}
