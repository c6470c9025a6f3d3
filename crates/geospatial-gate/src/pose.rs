//! Real-world pose snapshots and coordinates.

use serde::{Deserialize, Serialize};

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above the WGS84 ellipsoid.
    pub altitude: f64,
}

impl GeoCoordinates {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// Rotation quaternion in the East-Up-North frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

/// Immutable snapshot of the camera's geospatial pose for one tick.
///
/// A device that is not tracking is represented by [`PoseSample::NOT_TRACKING`],
/// the all-zero sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseSample {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub horizontal_accuracy: f64,
    pub vertical_accuracy: f64,
    pub yaw_accuracy: f64,
    pub heading_rotation: Quaternion,
}

impl PoseSample {
    /// The zero-value sample used whenever the runtime is not tracking.
    pub const NOT_TRACKING: PoseSample = PoseSample {
        latitude: 0.0,
        longitude: 0.0,
        altitude: 0.0,
        horizontal_accuracy: 0.0,
        vertical_accuracy: 0.0,
        yaw_accuracy: 0.0,
        heading_rotation: Quaternion {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 0.0,
        },
    };

    /// A sample at the origin with the given accuracies.
    pub fn with_accuracy(horizontal: f64, vertical: f64, yaw: f64) -> Self {
        Self {
            horizontal_accuracy: horizontal,
            vertical_accuracy: vertical,
            yaw_accuracy: yaw,
            heading_rotation: Quaternion::IDENTITY,
            ..Self::NOT_TRACKING
        }
    }

    /// Position part of the sample.
    pub fn coordinates(&self) -> GeoCoordinates {
        GeoCoordinates::new(self.latitude, self.longitude, self.altitude)
    }
}
