//! Reading results and the aggregate `readings` helper.

use serde::Serialize;

use crate::{
    AngularVelocity, EulerAngles, GeoPoint, MovementSensor, ReadOptions, SensorError, Vector3,
};

/// Result of a single read.
///
/// The best-known value always travels with the staleness verdict, so a
/// stale read still hands back the cached data alongside its error.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading<T> {
    /// Best-known value, possibly stale
    pub value: T,

    /// Staleness verdict; `None` when the value is fresh
    pub error: Option<SensorError>,
}

impl<T> Reading<T> {
    /// A reading with no error
    pub fn fresh(value: T) -> Self {
        Self { value, error: None }
    }

    /// Pair a value with the outcome of a staleness check
    pub fn checked(value: T, check: Result<(), SensorError>) -> Self {
        Self {
            value,
            error: check.err(),
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&SensorError> {
        self.error.as_ref()
    }

    /// Strict view: drop the value when the reading carries an error
    pub fn into_result(self) -> Result<T, SensorError> {
        match self.error {
            None => Ok(self.value),
            Some(err) => Err(err),
        }
    }
}

/// Composite of every motion read
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Readings {
    pub position: GeoPoint,
    pub altitude: f64,
    pub linear_velocity: Vector3,
    pub compass: f64,
    pub angular_velocity: AngularVelocity,
    pub linear_acceleration: Vector3,
    pub orientation: EulerAngles,
}

/// Assemble [`Readings`] by invoking each individual read.
///
/// Returns the first error encountered, so a stale sensor yields either the
/// descriptive staleness error or the capture sentinel, matching what the
/// individual reads would report.
pub async fn readings<S>(sensor: &S, options: &ReadOptions) -> Result<Readings, SensorError>
where
    S: MovementSensor + Sync,
{
    let position = sensor.position(options).await.into_result()?;
    let linear_velocity = sensor.linear_velocity(options).await.into_result()?;
    let compass = sensor.compass_heading(options).await.into_result()?;
    let angular_velocity = sensor.angular_velocity(options).await.into_result()?;
    let linear_acceleration = sensor.linear_acceleration(options).await.into_result()?;
    let orientation = sensor.orientation(options).await.into_result()?;

    Ok(Readings {
        position: position.point,
        altitude: position.altitude,
        linear_velocity,
        compass,
        angular_velocity,
        linear_acceleration,
        orientation,
    })
}
