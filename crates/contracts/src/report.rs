//! TpvReport - decoded time-position-velocity report delivered by the feed

use serde::{Deserialize, Serialize};

/// Latest decoded positional report.
///
/// Always replaced as a whole; never partially updated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TpvReport {
    /// Latitude (degrees)
    pub lat: f64,

    /// Longitude (degrees)
    pub lon: f64,

    /// Altitude (meters)
    pub alt: f64,

    /// Speed over ground (m/s)
    pub speed: f64,

    /// Course over ground (degrees from true north)
    pub track: f64,
}

impl TpvReport {
    /// Create a report
    pub fn new(lat: f64, lon: f64, alt: f64, speed: f64, track: f64) -> Self {
        Self {
            lat,
            lon,
            alt,
            speed,
            track,
        }
    }
}
