//! Staleness policy
//!
//! Decides, per read, whether cached data may be returned without error.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use contracts::{ReadOptions, SensorError};

/// Default maximum data age
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60);

/// Freshness contract applied to every motion read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    max_age: TimeDelta,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE)
    }
}

impl StalenessPolicy {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age: TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn max_age(&self) -> TimeDelta {
        self.max_age
    }

    /// Age of the data at `now`; `None` when nothing was ever received
    pub fn age(last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<TimeDelta> {
        last_update.map(|at| now.signed_duration_since(at))
    }

    /// True when data stamped `last_update` is still fresh at `now`
    pub fn is_fresh(&self, last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        matches!(Self::age(last_update, now), Some(age) if age < self.max_age)
    }

    /// Apply the policy.
    ///
    /// - fresh: `Ok(())`
    /// - stale, automated capture: [`SensorError::NoDataToCapture`]
    /// - stale otherwise: [`SensorError::StaleData`] carrying the last update
    ///   and the options
    ///
    /// Never having received data counts as stale.
    pub fn check(
        &self,
        last_update: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        options: &ReadOptions,
    ) -> Result<(), SensorError> {
        if self.is_fresh(last_update, now) {
            return Ok(());
        }

        if options.from_automated_capture {
            return Err(SensorError::NoDataToCapture);
        }

        Err(SensorError::StaleData {
            last_update,
            options: *options,
        })
    }
}
