//! # GPS Sensor
//!
//! Continuously-updated GPS state cache over a gpsd feed.
//!
//! Responsibilities:
//! - Open the feed once at construction and keep it watching
//! - Hand each delivered report to the cache through a channel
//! - Serve point-in-time position / velocity / heading reads
//! - Flag stale data, softly for automated capture, loudly otherwise
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{MovementSensor, ReadOptions, SensorConfig};
//! use gps_sensor::GpsSensor;
//!
//! let sensor = GpsSensor::new(&SensorConfig::new("gps"), &connector).await?;
//! let reading = sensor.position(&ReadOptions::default()).await;
//! if let Some(err) = reading.error() {
//!     tracing::warn!(error = %err, "position is stale");
//! }
//! sensor.close().await?;
//! ```

mod cache;
mod ingest;
mod sensor;
mod staleness;

pub use cache::{CacheSnapshot, ReportCache};
pub use contracts::{MovementSensor, ReadOptions, Reading, Readings, SensorError};
pub use ingest::{IngestMetrics, IngestStats};
pub use sensor::GpsSensor;
pub use staleness::{StalenessPolicy, DEFAULT_MAX_AGE};
