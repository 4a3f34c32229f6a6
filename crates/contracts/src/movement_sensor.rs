//! MovementSensor trait - read API exposed to callers
//!
//! Every read takes [`ReadOptions`]. Motion reads return a [`Reading`] so the
//! cached value is available even when the read is stale.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::{
    AngularVelocity, EulerAngles, Position, Properties, ReadOptions, Reading, Readings,
    SensorError, SensorName, Vector3,
};

/// Movement sensor read API
///
/// Reads never block waiting for new data; they answer from whatever is
/// currently known. Dropping a returned future cancels the read.
#[trait_variant::make(MovementSensor: Send)]
pub trait LocalMovementSensor {
    /// Sensor identity
    fn name(&self) -> &SensorName;

    /// Geographic point and altitude
    async fn position(&self, options: &ReadOptions) -> Reading<Position>;

    /// Linear velocity (m/s)
    async fn linear_velocity(&self, options: &ReadOptions) -> Reading<Vector3>;

    /// Angular velocity
    async fn angular_velocity(&self, options: &ReadOptions) -> Reading<AngularVelocity>;

    /// Linear acceleration (m/s²)
    async fn linear_acceleration(&self, options: &ReadOptions) -> Reading<Vector3>;

    /// Compass heading (degrees)
    async fn compass_heading(&self, options: &ReadOptions) -> Reading<f64>;

    /// Orientation
    async fn orientation(&self, options: &ReadOptions) -> Reading<EulerAngles>;

    /// Capability flags
    async fn properties(&self, options: &ReadOptions) -> Result<Properties, SensorError>;

    /// Accuracy estimates keyed by name, if any
    async fn accuracy(
        &self,
        options: &ReadOptions,
    ) -> Result<Option<HashMap<String, f32>>, SensorError>;

    /// Model-specific command
    async fn do_command(
        &self,
        command: &Map<String, Value>,
    ) -> Result<Option<Map<String, Value>>, SensorError>;

    /// Aggregate of all motion reads
    ///
    /// Implementations normally delegate to [`crate::readings`].
    async fn readings(&self, options: &ReadOptions) -> Result<Readings, SensorError>;
}
