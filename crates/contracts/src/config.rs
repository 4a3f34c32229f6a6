//! SensorConfig - construction parameters for a gpsd movement sensor

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sensor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SensorConfig {
    /// Sensor name (identity)
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,

    /// gpsd address (`host:port`)
    #[serde(default = "default_feed_address")]
    #[validate(length(min = 1, message = "feed_address must not be empty"))]
    pub feed_address: String,

    /// Age after which cached data is considered stale (seconds)
    #[serde(default = "default_stale_after_secs")]
    #[validate(range(min = 1, message = "stale_after_secs must be >= 1"))]
    pub stale_after_secs: u64,
}

fn default_feed_address() -> String {
    "localhost:2947".to_string()
}

fn default_stale_after_secs() -> u64 {
    60
}

impl SensorConfig {
    /// Configuration with defaults for everything but the name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            feed_address: default_feed_address(),
            stale_after_secs: default_stale_after_secs(),
        }
    }

    /// Staleness threshold
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}
