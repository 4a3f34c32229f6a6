//! ReadOptions - per-call options for the read API

use serde::{Deserialize, Serialize};

/// Options accepted by every read operation.
///
/// Only affects what a stale read reports, never the cached values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Call originates from the automated background data-capture path
    #[serde(default)]
    pub from_automated_capture: bool,
}

impl ReadOptions {
    /// Options for a call from automated data capture
    pub fn capture() -> Self {
        Self {
            from_automated_capture: true,
        }
    }
}
