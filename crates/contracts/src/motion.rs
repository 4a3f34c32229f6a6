//! Geometric value types returned by the read API.
//!
//! Plain data carriers, no behaviour of their own.

use serde::{Deserialize, Serialize};

/// Geographic point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude (degrees)
    pub lat: f64,
    /// Longitude (degrees)
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Position read result: point plus altitude (meters)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub point: GeoPoint,
    pub altitude: f64,
}

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Angular velocity (degrees/s per axis)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AngularVelocity {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Orientation as Euler angles (radians)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Capability flags
///
/// Record which data channels have been proven to work, not whether the
/// data is currently fresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    pub position_supported: bool,
    pub compass_heading_supported: bool,
    pub linear_velocity_supported: bool,
}

impl Properties {
    /// Flags set once a positional report has been delivered
    pub fn from_positional_report() -> Self {
        Self {
            position_supported: true,
            compass_heading_supported: true,
            linear_velocity_supported: true,
        }
    }
}
