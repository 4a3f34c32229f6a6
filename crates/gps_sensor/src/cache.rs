//! Report cache - latest report plus its arrival time
//!
//! One writer (the ingest task) and any number of readers. A single mutex
//! guards report, timestamp and capability flags together, and reads copy
//! the whole triple out so nothing refers into guarded memory after the
//! lock is released.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use contracts::{Properties, TpvReport};

/// Point-in-time copy of the cache
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheSnapshot {
    /// Most recently delivered report
    pub report: TpvReport,

    /// Instant of the last successful update; `None` = never received data
    pub last_update: Option<DateTime<Utc>>,

    /// Capability flags
    pub properties: Properties,
}

/// Lock-guarded latest-report cache
#[derive(Debug, Default)]
pub struct ReportCache {
    state: Mutex<CacheSnapshot>,
}

impl ReportCache {
    /// Create an empty cache (never updated, all capabilities unsupported)
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored report and stamp it with its delivery time.
    ///
    /// Also marks every capability as supported. The stamp never moves
    /// backwards, even if the clock does. Returns the recorded stamp.
    pub fn update(&self, report: TpvReport, delivered_at: DateTime<Utc>) -> DateTime<Utc> {
        let mut state = self.lock();
        let stamp = match state.last_update {
            Some(previous) if previous > delivered_at => previous,
            _ => delivered_at,
        };
        *state = CacheSnapshot {
            report,
            last_update: Some(stamp),
            properties: Properties::from_positional_report(),
        };
        stamp
    }

    /// Copy out report, timestamp and flags under one lock acquisition
    pub fn snapshot(&self) -> CacheSnapshot {
        *self.lock()
    }

    // Every critical section writes a whole snapshot, so a poisoned lock
    // still holds consistent data.
    fn lock(&self) -> MutexGuard<'_, CacheSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use rand::Rng;
    use std::sync::Arc;
    use std::thread;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = ReportCache::new();
        let snapshot = cache.snapshot();
        assert_eq!(snapshot.last_update, None);
        assert_eq!(snapshot.properties, Properties::default());
        assert_eq!(snapshot.report, TpvReport::default());
    }

    #[test]
    fn test_update_replaces_report_and_sets_flags() {
        let cache = ReportCache::new();

        let report = TpvReport::new(37.0, -122.0, 10.0, 2.5, 90.0);
        let stamp = cache.update(report, start());

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.report, report);
        assert_eq!(snapshot.last_update, Some(stamp));
        assert_eq!(stamp, start());
        assert_eq!(snapshot.properties, Properties::from_positional_report());
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let cache = ReportCache::new();
        cache.update(TpvReport::new(1.0, 2.0, 3.0, 4.0, 5.0), start());
        assert_eq!(cache.snapshot(), cache.snapshot());
    }

    #[test]
    fn test_timestamp_never_moves_backwards() {
        let cache = ReportCache::new();

        let first = cache.update(TpvReport::default(), start());
        let second = cache.update(
            TpvReport::new(1.0, 1.0, 1.0, 1.0, 1.0),
            start() - TimeDelta::seconds(30),
        );

        assert_eq!(second, first);
        assert_eq!(cache.snapshot().report.lat, 1.0);
    }

    #[test]
    fn test_flags_stay_set_across_updates() {
        let cache = ReportCache::new();
        cache.update(TpvReport::default(), start());
        cache.update(TpvReport::default(), start() + TimeDelta::hours(2));
        assert!(cache.snapshot().properties.position_supported);
    }

    /// Writers publish reports whose every field encodes the same sequence
    /// number; readers must never observe a mix.
    #[test]
    fn test_concurrent_update_and_snapshot_never_tear() {
        let cache = Arc::new(ReportCache::new());
        let writers = 4;
        let readers = 8;
        let iterations = 2_000;

        thread::scope(|scope| {
            for w in 0..writers {
                let cache = cache.clone();
                scope.spawn(move || {
                    let mut rng = rand::rng();
                    for _ in 0..iterations {
                        let v = (w * iterations) as f64 + rng.random_range(0.0..1.0);
                        cache.update(TpvReport::new(v, v, v, v, v), Utc::now());
                    }
                });
            }

            for _ in 0..readers {
                let cache = cache.clone();
                scope.spawn(move || {
                    for _ in 0..iterations {
                        let snapshot = cache.snapshot();
                        let r = snapshot.report;
                        assert_eq!(r.lat, r.lon);
                        assert_eq!(r.lat, r.alt);
                        assert_eq!(r.lat, r.speed);
                        assert_eq!(r.lat, r.track);
                        if snapshot.last_update.is_none() {
                            assert_eq!(r, TpvReport::default());
                            assert!(!snapshot.properties.position_supported);
                        } else {
                            assert!(snapshot.properties.position_supported);
                        }
                    }
                });
            }
        });

        assert!(cache.snapshot().last_update.is_some());
    }
}
