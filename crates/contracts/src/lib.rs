//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace:
//! report and motion value types, the `MovementSensor` read API, the feed
//! capability traits, configuration and error types.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Wall-clock UTC instants (`chrono::DateTime<Utc>`) obtained from a [`Clock`]
//! - "Never received data" is `None`, and is treated as maximally stale

mod clock;
mod config;
mod error;
mod feed;
mod motion;
mod movement_sensor;
mod options;
mod reading;
mod report;
mod sensor_name;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SensorConfig;
pub use error::*;
pub use feed::{FeedConnection, FeedConnector, LocalFeedConnector, ReportCallback};
pub use motion::*;
pub use movement_sensor::{LocalMovementSensor, MovementSensor};
pub use options::ReadOptions;
pub use reading::{readings, Reading, Readings};
pub use report::TpvReport;
pub use sensor_name::{Model, SensorName, MOVEMENT_SENSOR_MODEL};
